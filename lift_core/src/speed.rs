//! Analog knob position to step period.
//!
//! Each update clamps the raw sample into the configured ADC window, smooths it
//! with an integer exponential filter, maps it linearly onto the period range and
//! ramps the emitted period toward that target by a bounded amount.

use crate::error::ConfigError;

/// Static mapping parameters, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedMapperConfig {
    /// Lower bound of the usable raw range.
    pub adc_min: u32,
    /// Upper bound of the usable raw range.
    pub adc_max: u32,
    /// Fastest period (ms).
    pub min_period_ms: u32,
    /// Slowest period (ms).
    pub max_period_ms: u32,
    /// Largest period change per update (ms).
    pub ramp_step_ms: u32,
    /// When true a higher sample yields a shorter period.
    pub invert: bool,
    /// Filter weight `1 / 2^filter_shift` for each new sample; 0 passes samples through.
    pub filter_shift: u8,
}

impl Default for SpeedMapperConfig {
    fn default() -> Self {
        Self {
            adc_min: 100,
            adc_max: 3300,
            min_period_ms: 1,
            max_period_ms: 10,
            ramp_step_ms: 1,
            invert: true,
            filter_shift: 2,
        }
    }
}

impl SpeedMapperConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.adc_min >= self.adc_max {
            return Err(ConfigError::AdcRange {
                min: self.adc_min,
                max: self.adc_max,
            });
        }
        if self.min_period_ms > self.max_period_ms {
            return Err(ConfigError::PeriodRange {
                min: self.min_period_ms,
                max: self.max_period_ms,
            });
        }
        if self.ramp_step_ms == 0 {
            return Err(ConfigError::ZeroRamp);
        }
        if self.filter_shift > 8 {
            return Err(ConfigError::FilterShift(self.filter_shift));
        }
        Ok(())
    }

    /// Raw value that maps to the slowest period; a safe value to seed the
    /// shared sample with before the first conversion lands.
    pub fn slowest_sample(&self) -> u32 {
        if self.invert { self.adc_min } else { self.adc_max }
    }
}

#[derive(Debug, Clone)]
pub struct SpeedMapper {
    cfg: SpeedMapperConfig,
    filtered: u32,
    current_period_ms: u32,
    primed: bool,
}

impl SpeedMapper {
    pub fn new(cfg: SpeedMapperConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            filtered: cfg.adc_min,
            // Start from the slowest period and ramp up from there.
            current_period_ms: cfg.max_period_ms,
            primed: false,
        })
    }

    /// Positional form of [`SpeedMapper::new`] with the default filter.
    pub fn configure(
        adc_min: u32,
        adc_max: u32,
        min_period_ms: u32,
        max_period_ms: u32,
        ramp_step_ms: u32,
        invert: bool,
    ) -> Result<Self, ConfigError> {
        Self::new(SpeedMapperConfig {
            adc_min,
            adc_max,
            min_period_ms,
            max_period_ms,
            ramp_step_ms,
            invert,
            ..SpeedMapperConfig::default()
        })
    }

    /// Feed one raw sample and return the period to apply this iteration.
    pub fn update(&mut self, raw: u32) -> u32 {
        let clamped = raw.clamp(self.cfg.adc_min, self.cfg.adc_max);
        self.filtered = if self.primed {
            smooth(self.filtered, clamped, self.cfg.filter_shift)
        } else {
            self.primed = true;
            clamped
        };
        let target = self.target_period_ms(self.filtered);
        self.current_period_ms = ramp_toward(self.current_period_ms, target, self.cfg.ramp_step_ms);
        self.current_period_ms
    }

    /// Period the mapper is converging to for an already-filtered sample.
    pub fn target_period_ms(&self, filtered: u32) -> u32 {
        let c = &self.cfg;
        let f = filtered.clamp(c.adc_min, c.adc_max);
        let span_in = u64::from(c.adc_max - c.adc_min);
        let span_out = u64::from(c.max_period_ms - c.min_period_ms);
        let offset = u64::from(f - c.adc_min);
        // Rounded to nearest; offset <= span_in keeps this <= span_out.
        let scaled = u32::try_from((offset * span_out + span_in / 2) / span_in).unwrap_or(u32::MAX);
        if c.invert {
            c.max_period_ms - scaled
        } else {
            c.min_period_ms + scaled
        }
    }

    #[inline]
    pub fn filtered_sample(&self) -> u32 {
        self.filtered
    }

    #[inline]
    pub fn current_period_ms(&self) -> u32 {
        self.current_period_ms
    }

    pub fn config(&self) -> &SpeedMapperConfig {
        &self.cfg
    }
}

/// One exponential-filter step from `prev` toward `x`.
///
/// Moves by `(x - prev) / 2^shift`, but at least one count, so the output
/// always reaches `x` exactly instead of stalling a few counts short.
#[inline]
fn smooth(prev: u32, x: u32, shift: u8) -> u32 {
    if shift == 0 {
        return x;
    }
    let diff = i64::from(x) - i64::from(prev);
    let mut step = diff >> shift;
    if step == 0 {
        step = diff.signum();
    }
    u32::try_from(i64::from(prev) + step).unwrap_or(x)
}

#[inline]
fn ramp_toward(current: u32, target: u32, max_step: u32) -> u32 {
    if target > current {
        current.saturating_add(max_step).min(target)
    } else {
        current.saturating_sub(max_step).max(target)
    }
}
