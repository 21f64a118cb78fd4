use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[control]
hold_ms = 20
diag_interval_ms = 50

[runner]
idle_us = 100
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn json_line(stdout: &[u8], key: &str) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(stdout);
    let line = stdout
        .lines()
        .find(|l| l.contains(key))
        .unwrap_or_else(|| panic!("no JSON line with {key}; stdout was: {stdout}"));
    serde_json::from_str(line).expect("valid JSON")
}

/// Validate the JSON summary of a completed run.
#[rstest]
fn json_run_summary_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("lift_cli").unwrap();
    cmd.arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .arg("run")
        .args(["--duration-ms", "300"])
        .args(["--sim-break-every-ms", "100"])
        .args(["--sim-press-every-ms", "25"]);

    let out = cmd.assert().success().get_output().stdout.clone();
    let v = json_line(&out, "\"run_complete\"");

    for key in [
        "iterations",
        "elapsed_ms",
        "steps",
        "faults",
        "breaks",
        "resumes",
        "stalls",
        "over_budget",
    ] {
        assert!(v.get(key).and_then(|x| x.as_u64()).is_some(), "{key} should be a number");
    }
    assert!(v["iterations"].as_u64().unwrap() > 0);
    assert!(v["elapsed_ms"].as_u64().unwrap() >= 300);
    assert!(v["breaks"].as_u64().unwrap() >= 1);
    for key in ["min", "avg", "max"] {
        assert!(v["tick_us"][key].as_u64().is_some(), "tick_us.{key}");
    }
}

#[rstest]
fn json_self_check_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("lift_cli").unwrap();
    cmd.arg("--json").arg("--config").arg(&cfg).arg("self-check");

    let out = cmd.assert().success().get_output().stdout.clone();
    let v = json_line(&out, "\"self_check\"");
    assert_eq!(v["ok"], true);
    assert_eq!(v["backend"], "sim");
}

/// Errors are a single JSON object on stdout when --json is set.
#[rstest]
fn json_error_schema() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[speed]\nramp_ms = 0\n").unwrap();

    let mut cmd = Command::cargo_bin("lift_cli").unwrap();
    cmd.arg("--json").arg("--config").arg(&path).arg("self-check");

    let out = cmd.assert().code(2).get_output().stdout.clone();
    let v = json_line(&out, "\"reason\"");
    assert_eq!(v["reason"], "Config");
    assert!(v["message"].as_str().unwrap().contains("speed.ramp_ms"));
}
