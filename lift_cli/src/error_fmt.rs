//! Human-readable error descriptions and structured JSON error formatting.

use lift_core::error::{BuildError, ConfigError, LiftError};
use lift_hardware::error::HwError;

/// Broad failure class; decides the exit code and the JSON `reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Hardware,
    Other,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "Config",
            ErrorKind::Hardware => "Hardware",
            ErrorKind::Other => "Error",
        }
    }
}

pub fn classify(err: &eyre::Report) -> ErrorKind {
    for cause in err.chain() {
        if cause.is::<ConfigError>() {
            return ErrorKind::Config;
        }
        if cause.is::<HwError>() || cause.is::<LiftError>() {
            return ErrorKind::Hardware;
        }
    }
    let msg = format!("{err:#}").to_ascii_lowercase();
    if msg.contains("invalid configuration") || msg.contains("parse config") || msg.contains("read config") {
        return ErrorKind::Config;
    }
    if msg.contains("open adc") || msg.contains("pins") || msg.contains("gpio") || msg.contains("spi") {
        return ErrorKind::Hardware;
    }
    ErrorKind::Other
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        let part = match be {
            BuildError::MissingDriver => "step driver",
            BuildError::MissingBreakSensor => "break sensor",
            BuildError::MissingInputs => "input reader",
            BuildError::MissingSamples => "analog sample handle",
        };
        return format!(
            "What happened: No {part} was provided to the control loop.\nLikely causes: A device failed to initialize or was not wired into the builder.\nHow to fix: Check the log for the failing device and its [pins] entry."
        );
    }

    if let Some(ce) = err.chain().find_map(|c| c.downcast_ref::<ConfigError>()) {
        return format!(
            "What happened: Invalid control parameters ({ce}).\nLikely causes: Out-of-range values in the [speed] or [control] sections.\nHow to fix: Edit the config file, then rerun `self-check`."
        );
    }

    if let Some(le) = err.chain().find_map(|c| c.downcast_ref::<LiftError>()) {
        if matches!(le, LiftError::Timeout) {
            return "What happened: The speed ADC did not answer in time.\nLikely causes: MCP3208 not powered, wrong SPI bus/slave select, or sampler.timeout_ms too low.\nHow to fix: Verify wiring and [pins].adc_*, and consider raising sampler.timeout_ms.".to_string();
        }
        return format!(
            "What happened: {le}.\nLikely causes: Hardware not connected or not responding.\nHow to fix: Check wiring and power, then re-run with --log-level=debug."
        );
    }

    // String-based heuristics for errors coming from init or config
    let msg = format!("{err:#}");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("open adc") {
        return format!(
            "What happened: Failed to open the speed ADC.\nLikely causes: SPI disabled, wrong bus/slave select, or missing permissions.\nHow to fix: Enable SPI, fix [pins].adc_bus/adc_ss, and check access to /dev/spidev*. Original: {msg}"
        );
    }

    if lower.contains("open motor pins")
        || lower.contains("open photo-interrupter pins")
        || lower.contains("open button pins")
    {
        return format!(
            "What happened: Failed to initialize hardware pins.\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO. Original: {msg}"
        );
    }

    if lower.contains("read config") {
        return format!(
            "What happened: The config file could not be read.\nLikely causes: Wrong --config path or missing file.\nHow to fix: Pass --config <FILE> pointing at a readable TOML file. Original: {msg}"
        );
    }

    if lower.contains("invalid configuration") || lower.contains("parse config") {
        return format!(
            "What happened: Configuration is invalid or incomplete.\nLikely causes: A typo, a value out of range, or an unknown option.\nHow to fix: Edit the TOML config and try again. Details: {msg}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 for configuration, 3 for hardware, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match classify(err) {
        ErrorKind::Config => 2,
        ErrorKind::Hardware => 3,
        ErrorKind::Other => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": classify(err).as_str(),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;

    #[test]
    fn config_errors_map_to_exit_two() {
        let err = eyre::Report::new(ConfigError::ZeroHold);
        assert_eq!(exit_code_for_error(&err), 2);
        assert!(humanize(&err).contains("hold_ms"));

        let wrapped: eyre::Result<()> =
            Err(eyre::eyre!("speed.ramp_ms must be > 0")).wrap_err("invalid configuration in x.toml");
        assert_eq!(exit_code_for_error(&wrapped.unwrap_err()), 2);
    }

    #[test]
    fn hardware_errors_map_to_exit_three() {
        let res: Result<(), HwError> = Err(HwError::Spi("no device".into()));
        let err = res.wrap_err("open adc").unwrap_err();
        assert_eq!(exit_code_for_error(&err), 3);
        assert!(humanize(&err).contains("speed ADC"));
    }

    #[test]
    fn build_errors_are_humanized() {
        let err = eyre::Report::new(BuildError::MissingBreakSensor);
        assert!(humanize(&err).contains("break sensor"));
        assert_eq!(exit_code_for_error(&err), 1);
    }

    #[test]
    fn json_has_reason_and_message() {
        let err = eyre::Report::new(LiftError::Timeout);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Hardware");
        assert!(v["message"].as_str().unwrap().contains("ADC"));
    }
}
