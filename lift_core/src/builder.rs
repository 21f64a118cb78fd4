//! Type-state builder for [`ControlLoop`].
//!
//! The step driver, break sensor and input reader are tracked in the type so
//! `build()` only exists once all three are supplied; `try_build()` works in
//! any state and reports what is missing. Everything else has a default.

use std::marker::PhantomData;

use lift_traits::{BreakSensor, Clock, DiagnosticSink, InputReader, MonotonicClock, StepDriver};

use crate::config::LoopCfg;
use crate::control::{ControlLoop, LiftState};
use crate::error::{BuildError, Result};
use crate::logger::TracingSink;
use crate::sampler::SampleHandle;
use crate::speed::{SpeedMapper, SpeedMapperConfig};
use crate::status::LoopMode;
use crate::stepper::StepEngine;
use crate::timer::ElapsedTimer;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

pub struct LiftBuilder<D, B, I> {
    driver: Option<Box<dyn StepDriver>>,
    breaks: Option<Box<dyn BreakSensor>>,
    inputs: Option<Box<dyn InputReader>>,
    samples: Option<SampleHandle>,
    speed: Option<SpeedMapperConfig>,
    loop_cfg: Option<LoopCfg>,
    clock: Option<Box<dyn Clock>>,
    sink: Option<Box<dyn DiagnosticSink>>,
    _d: PhantomData<D>,
    _b: PhantomData<B>,
    _i: PhantomData<I>,
}

impl Default for LiftBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            driver: None,
            breaks: None,
            inputs: None,
            samples: None,
            speed: None,
            loop_cfg: None,
            clock: None,
            sink: None,
            _d: PhantomData,
            _b: PhantomData,
            _i: PhantomData,
        }
    }
}

impl<D, B, I> LiftBuilder<D, B, I> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<ControlLoop> {
        let driver = self
            .driver
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDriver))?;
        let breaks = self
            .breaks
            .ok_or_else(|| eyre::Report::new(BuildError::MissingBreakSensor))?;
        let inputs = self
            .inputs
            .ok_or_else(|| eyre::Report::new(BuildError::MissingInputs))?;
        let samples = self
            .samples
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSamples))?;

        let mapper = SpeedMapper::new(self.speed.unwrap_or_default()).map_err(eyre::Report::new)?;
        let cfg = self.loop_cfg.unwrap_or_default();
        cfg.validate().map_err(eyre::Report::new)?;

        let clock = self
            .clock
            .unwrap_or_else(|| Box::new(MonotonicClock::new()));
        let sink = self.sink.unwrap_or_else(|| Box::new(TracingSink));

        let now = clock.now_ms();
        let mut engine = StepEngine::new(driver, mapper.current_period_ms());
        engine.set_direction(cfg.direction);
        engine.resume(now);
        let mut diag = ElapsedTimer::new();
        diag.arm(now, cfg.diag_interval_ms);

        tracing::info!(
            hold_ms = cfg.hold_ms,
            diag_interval_ms = cfg.diag_interval_ms,
            inputs = cfg.input_channels.len(),
            direction = cfg.direction.as_str(),
            min_period_ms = mapper.config().min_period_ms,
            max_period_ms = mapper.config().max_period_ms,
            "control loop ready"
        );

        Ok(ControlLoop::new(LiftState {
            clock,
            raw: samples.get(),
            samples,
            engine,
            mapper,
            breaks,
            inputs,
            sink,
            cfg,
            hold: ElapsedTimer::new(),
            diag,
            now_ms: now,
            input_pressed: false,
            mode: LoopMode::Active,
            breaks_seen: 0,
            resumes: 0,
            last_break: None,
        }))
    }

    fn retype<D2, B2, I2>(self) -> LiftBuilder<D2, B2, I2> {
        LiftBuilder {
            driver: self.driver,
            breaks: self.breaks,
            inputs: self.inputs,
            samples: self.samples,
            speed: self.speed,
            loop_cfg: self.loop_cfg,
            clock: self.clock,
            sink: self.sink,
            _d: PhantomData,
            _b: PhantomData,
            _i: PhantomData,
        }
    }
}

/// Chainable setters that do not affect type-state.
impl<D, B, I> LiftBuilder<D, B, I> {
    /// Reader side of the shared raw sample. Required.
    pub fn with_samples(mut self, samples: SampleHandle) -> Self {
        self.samples = Some(samples);
        self
    }
    pub fn with_speed(mut self, speed: SpeedMapperConfig) -> Self {
        self.speed = Some(speed);
        self
    }
    pub fn with_loop(mut self, cfg: LoopCfg) -> Self {
        self.loop_cfg = Some(cfg);
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }
    /// Diagnostic output; defaults to [`TracingSink`].
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }
}

// Setters that advance type-state
impl<B, I> LiftBuilder<Missing, B, I> {
    pub fn with_driver(self, driver: impl StepDriver + 'static) -> LiftBuilder<Set, B, I> {
        let mut next = self.retype();
        next.driver = Some(Box::new(driver));
        next
    }
}

impl<D, I> LiftBuilder<D, Missing, I> {
    pub fn with_break_sensor(
        self,
        sensor: impl BreakSensor + 'static,
    ) -> LiftBuilder<D, Set, I> {
        let mut next = self.retype();
        next.breaks = Some(Box::new(sensor));
        next
    }
}

impl<D, B> LiftBuilder<D, B, Missing> {
    pub fn with_inputs(self, inputs: impl InputReader + 'static) -> LiftBuilder<D, B, Set> {
        let mut next = self.retype();
        next.inputs = Some(Box::new(inputs));
        next
    }
}

impl LiftBuilder<Set, Set, Set> {
    /// Validate and build. Only available once driver, break sensor and inputs are set.
    pub fn build(self) -> Result<ControlLoop> {
        self.try_build()
    }
}
