#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the lift controller.
//!
//! - `Config` and its sections are deserialized from TOML; every section has
//!   defaults matching the reference installation, so an empty file is valid.
//! - `Config::validate()` rejects values the control loop cannot run with,
//!   naming the offending `section.field` in the message.
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SpeedCfg {
    /// Lower bound of the usable raw ADC range (counts).
    pub adc_min: u32,
    /// Upper bound of the usable raw ADC range (counts).
    pub adc_max: u32,
    /// Fastest step period (ms).
    pub min_period_ms: u32,
    /// Slowest step period (ms).
    pub max_period_ms: u32,
    /// Largest change of the step period per loop iteration (ms).
    pub ramp_ms: u32,
    /// When true, turning the knob up shortens the period (faster car).
    pub invert: bool,
    /// Exponential smoothing factor as a power of two (0 disables smoothing).
    pub filter_shift: u8,
}

impl Default for SpeedCfg {
    fn default() -> Self {
        Self {
            adc_min: 100,
            adc_max: 3300,
            min_period_ms: 1,
            max_period_ms: 10,
            ramp_ms: 1,
            invert: true,
            filter_shift: 2,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DirectionCfg {
    #[default]
    Cw,
    Ccw,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ControlCfg {
    /// Minimum time the car stays stopped after a beam break (ms).
    pub hold_ms: u32,
    /// Interval between diagnostic snapshots (ms).
    pub diag_interval_ms: u32,
    /// Input channels that acknowledge a stop.
    pub buttons: Vec<u8>,
    /// Travel direction applied while running.
    pub direction: DirectionCfg,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self {
            hold_ms: 500,
            diag_interval_ms: 1000,
            buttons: vec![0, 1, 2],
            direction: DirectionCfg::Cw,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SamplerCfg {
    /// ADC conversions per second.
    pub rate_hz: u32,
    /// Max wait for one conversion (ms).
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

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RunnerCfg {
    /// Sleep between loop iterations (µs); 0 spins.
    pub idle_us: u64,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self { idle_us: 200 }
    }
}

/// GPIO/SPI wiring. Only read by hardware builds.
#[derive(Debug, Deserialize, Clone)]
pub struct Pins {
    pub motor_step: u8,
    pub motor_dir: u8,
    pub motor_en: Option<u8>,
    /// One photo-interrupter per floor, index = floor number.
    pub photo: Vec<u8>,
    /// Broken beam reads low.
    #[serde(default = "default_true")]
    pub photo_active_low: bool,
    /// One button pin per input channel, index = channel.
    pub buttons: Vec<u8>,
    #[serde(default)]
    pub adc_bus: u8,
    #[serde(default)]
    pub adc_ss: u8,
    #[serde(default)]
    pub adc_channel: u8,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub speed: SpeedCfg,
    #[serde(default)]
    pub control: ControlCfg,
    #[serde(default)]
    pub sampler: SamplerCfg,
    #[serde(default)]
    pub runner: RunnerCfg,
    #[serde(default)]
    pub pins: Option<Pins>,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    use eyre::WrapErr;
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = load_toml(&text).wrap_err_with(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .wrap_err_with(|| format!("invalid configuration in {}", path.display()))?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Speed
        if self.speed.adc_min >= self.speed.adc_max {
            eyre::bail!(
                "speed.adc_min must be < speed.adc_max (got {} >= {})",
                self.speed.adc_min,
                self.speed.adc_max
            );
        }
        if self.speed.min_period_ms == 0 {
            eyre::bail!("speed.min_period_ms must be >= 1");
        }
        if self.speed.min_period_ms > self.speed.max_period_ms {
            eyre::bail!(
                "speed.min_period_ms must be <= speed.max_period_ms (got {} > {})",
                self.speed.min_period_ms,
                self.speed.max_period_ms
            );
        }
        if self.speed.max_period_ms > 60_000 {
            eyre::bail!("speed.max_period_ms is unreasonably large (>60s)");
        }
        if self.speed.ramp_ms == 0 {
            eyre::bail!("speed.ramp_ms must be > 0");
        }
        if self.speed.filter_shift > 8 {
            eyre::bail!("speed.filter_shift must be in [0, 8]");
        }

        // Control
        if self.control.hold_ms == 0 {
            eyre::bail!("control.hold_ms must be >= 1");
        }
        if self.control.diag_interval_ms == 0 {
            eyre::bail!("control.diag_interval_ms must be >= 1");
        }
        if self.control.buttons.is_empty() {
            eyre::bail!("control.buttons must list at least one channel");
        }
        for (i, ch) in self.control.buttons.iter().enumerate() {
            if self.control.buttons[..i].contains(ch) {
                eyre::bail!("control.buttons lists channel {ch} twice");
            }
        }

        // Sampler
        if self.sampler.rate_hz == 0 || self.sampler.rate_hz > 100_000 {
            eyre::bail!("sampler.rate_hz must be in [1, 100000]");
        }
        if self.sampler.timeout_ms == 0 {
            eyre::bail!("sampler.timeout_ms must be >= 1");
        }

        // Runner
        if self.runner.idle_us > 100_000 {
            eyre::bail!("runner.idle_us must be <= 100000 (the loop would starve step timing)");
        }

        // Pins
        if let Some(pins) = &self.pins {
            if pins.photo.is_empty() {
                eyre::bail!("pins.photo must list at least one sensor pin");
            }
            if pins.photo.len() > usize::from(u8::MAX) {
                eyre::bail!("pins.photo lists more than 255 floors");
            }
            if let Some(max_ch) = self.control.buttons.iter().max()
                && usize::from(*max_ch) >= pins.buttons.len()
            {
                eyre::bail!("pins.buttons has no pin for control.buttons channel {max_ch}");
            }
            if pins.adc_channel > 7 {
                eyre::bail!("pins.adc_channel must be in [0, 7]");
            }
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly (got {rot:?})");
        }

        Ok(())
    }
}
