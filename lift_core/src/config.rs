//! Runtime configuration for the control loop and the sampler.
//!
//! These are separate from the TOML-deserialized config in `lift_config`;
//! see `conversions` for the mapping. The speed mapping parameters live next
//! to the mapper as `SpeedMapperConfig`.

use lift_traits::Direction;

use crate::error::ConfigError;

/// Control loop configuration.
#[derive(Debug, Clone)]
pub struct LoopCfg {
    /// Time the car stays stopped after a beam break before an input can resume it (ms).
    pub hold_ms: u32,
    /// Minimum interval between diagnostic snapshots (ms).
    pub diag_interval_ms: u32,
    /// Input channels polled every iteration; any pressed one acknowledges a stop.
    pub input_channels: Vec<u8>,
    /// Direction applied while active.
    pub direction: Direction,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self {
            hold_ms: 500,
            diag_interval_ms: 1000,
            input_channels: vec![0, 1, 2],
            direction: Direction::Cw,
        }
    }
}

impl LoopCfg {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hold_ms == 0 {
            return Err(ConfigError::ZeroHold);
        }
        if self.diag_interval_ms == 0 {
            return Err(ConfigError::ZeroDiagInterval);
        }
        if self.input_channels.is_empty() {
            return Err(ConfigError::NoInputs);
        }
        Ok(())
    }
}

/// Background sampler configuration.
#[derive(Debug, Clone)]
pub struct SamplerCfg {
    /// Conversions per second.
    pub rate_hz: u32,
    /// Max wait per conversion (ms).
    pub timeout_ms: u64,
}

impl Default for SamplerCfg {
    fn default() -> Self {
        Self {
            rate_hz: 1000,
            timeout_ms: 10,
        }
    }
}
