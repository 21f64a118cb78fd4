use thiserror::Error;

/// Invalid construction-time parameters. Fatal: the loop is never entered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("adc_min ({min}) must be < adc_max ({max})")]
    AdcRange { min: u32, max: u32 },
    #[error("min_period_ms ({min}) must be <= max_period_ms ({max})")]
    PeriodRange { min: u32, max: u32 },
    #[error("ramp_step_ms must be > 0")]
    ZeroRamp,
    #[error("filter_shift must be <= 8 (got {0})")]
    FilterShift(u8),
    #[error("hold_ms must be > 0")]
    ZeroHold,
    #[error("diag_interval_ms must be > 0")]
    ZeroDiagInterval,
    #[error("at least one input channel is required")]
    NoInputs,
}

#[derive(Debug, Error, Clone)]
pub enum LiftError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("analog conversion timeout")]
    Timeout,
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("missing step driver")]
    MissingDriver,
    #[error("missing break sensor")]
    MissingBreakSensor,
    #[error("missing input reader")]
    MissingInputs,
    #[error("missing analog sample handle")]
    MissingSamples,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
