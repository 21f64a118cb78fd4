//! Maps `Box<dyn Error>` from trait boundaries to typed `LiftError`.
//!
//! The traits in `lift_traits` use `Box<dyn Error + Send + Sync>`; this module
//! converts those to our typed error enum, with an optional feature-gated path
//! for `lift_hardware::HwError` downcasting.

use crate::error::LiftError;

/// Map a trait-boundary error to a typed `LiftError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> LiftError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<lift_hardware::error::HwError>() {
            return match hw {
                lift_hardware::error::HwError::Timeout => LiftError::Timeout,
                lift_hardware::error::HwError::NotStarted
                | lift_hardware::error::HwError::Released => LiftError::State(hw.to_string()),
                other => LiftError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        LiftError::Timeout
    } else {
        LiftError::Hardware(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_errors_fall_back_to_message() {
        let e = std::io::Error::other("bus glitch");
        assert!(matches!(map_hw_error(&e), LiftError::Hardware(m) if m == "bus glitch"));
        let t = std::io::Error::other("read Timeout on ch0");
        assert!(matches!(map_hw_error(&t), LiftError::Timeout));
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn hw_errors_are_downcast() {
        use lift_hardware::error::HwError;
        assert!(matches!(map_hw_error(&HwError::Timeout), LiftError::Timeout));
        assert!(matches!(map_hw_error(&HwError::Released), LiftError::State(_)));
        assert!(matches!(
            map_hw_error(&HwError::Spi("nack".into())),
            LiftError::HardwareFault(m) if m.contains("nack")
        ));
    }
}
