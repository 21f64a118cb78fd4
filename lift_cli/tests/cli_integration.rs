use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Minimal valid config for the simulated backend; short hold so resumes happen quickly
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[speed]
adc_min = 100
adc_max = 3300
min_period_ms = 1
max_period_ms = 10
ramp_ms = 1
invert = true

[control]
hold_ms = 20
diag_interval_ms = 100
buttons = [0, 1, 2]
direction = "cw"

[sampler]
rate_hz = 1000
timeout_ms = 10

[runner]
idle_us = 100
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["self-check"], 0, "self-check ok (sim)", "stdout")]
#[case(&["run", "--duration-ms", "100"], 0, "run complete", "stdout")]
#[case(&["run", "--duration-ms", "50", "--stats"], 0, "Lift Stats", "stderr")]
#[case(&["run", "--duration-ms", "abc"], 2, "invalid value", "stderr")]
#[case(&["fly"], 2, "unrecognized subcommand", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("lift_cli").unwrap();

    // Always include a valid config to avoid relying on default path
    cmd.arg("--config").arg(&cfg).arg("--log-level").arg("error");

    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);

    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn missing_config_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("lift_cli").unwrap();
    cmd.arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("self-check");

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("could not be read"));
}

#[rstest]
#[case("[speed]\nadc_min = 3300\nadc_max = 100\n", "speed.adc_min")]
#[case("[control]\nhold_ms = 0\n", "control.hold_ms")]
#[case("[control]\ndirection = \"up\"\n", "Configuration is invalid")]
#[case("[sampler]\nrate_hz = 0\n", "sampler.rate_hz")]
fn invalid_config_is_reported_with_exit_two(#[case] toml: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, toml).unwrap();

    let mut cmd = Command::cargo_bin("lift_cli").unwrap();
    cmd.arg("--config").arg(&path).arg("self-check");

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains(needle));
}

#[rstest]
fn simulated_breaks_and_presses_are_counted() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("lift_cli").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("--log-level")
        .arg("error")
        .arg("run")
        .args(["--duration-ms", "400"])
        .args(["--sim-adc", "3300"])
        .args(["--sim-break-every-ms", "100"])
        .args(["--sim-press-every-ms", "30"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::is_match(r"run complete: \d+ steps, [1-9]\d* breaks, [1-9]\d* resumes").unwrap());
}
