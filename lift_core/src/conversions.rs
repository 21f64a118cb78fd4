//! `From` implementations bridging `lift_config` types to `lift_core` types.

use lift_traits::Direction;

use crate::config::{LoopCfg, SamplerCfg};
use crate::speed::SpeedMapperConfig;

impl From<&lift_config::SpeedCfg> for SpeedMapperConfig {
    fn from(c: &lift_config::SpeedCfg) -> Self {
        Self {
            adc_min: c.adc_min,
            adc_max: c.adc_max,
            min_period_ms: c.min_period_ms,
            max_period_ms: c.max_period_ms,
            ramp_step_ms: c.ramp_ms,
            invert: c.invert,
            filter_shift: c.filter_shift,
        }
    }
}

// Orphan rule forbids `impl From<DirectionCfg> for Direction` here (both types
// are foreign), so the mapping lives in a local helper.
fn direction_from_cfg(d: lift_config::DirectionCfg) -> Direction {
    match d {
        lift_config::DirectionCfg::Cw => Direction::Cw,
        lift_config::DirectionCfg::Ccw => Direction::Ccw,
    }
}

impl From<&lift_config::ControlCfg> for LoopCfg {
    fn from(c: &lift_config::ControlCfg) -> Self {
        Self {
            hold_ms: c.hold_ms,
            diag_interval_ms: c.diag_interval_ms,
            input_channels: c.buttons.clone(),
            direction: direction_from_cfg(c.direction),
        }
    }
}

impl From<&lift_config::SamplerCfg> for SamplerCfg {
    fn from(c: &lift_config::SamplerCfg) -> Self {
        Self {
            rate_hz: c.rate_hz,
            timeout_ms: c.timeout_ms,
        }
    }
}
