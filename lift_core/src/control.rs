//! The cooperative control loop.
//!
//! One call to [`ControlLoop::tick`] runs the fixed task list once:
//!
//! 1. `read_inputs`: sample the tick, the shared raw value and every input channel
//! 2. `check_break`: a beam break pauses the car and restarts the hold countdown
//! 3. `check_resume`: once the hold has expired, any pressed input resumes
//! 4. `apply_speed`: feed the mapper; forward period and direction while active
//! 5. `step`: let the engine emit at most one pulse
//! 6. `diagnostics`: rate-limited status snapshot
//!
//! Nothing in a tick blocks and nothing in a tick can fail. Driver and sink
//! failures are logged and counted where they happen.

use lift_traits::{BreakSensor, Clock, Diagnostic, DiagnosticSink, InputReader, StepDriver};
use std::time::Duration;

use crate::config::LoopCfg;
use crate::sampler::SampleHandle;
use crate::scheduler::{Scheduler, Task};
use crate::speed::SpeedMapper;
use crate::status::LoopMode;
use crate::stepper::StepEngine;
use crate::timer::ElapsedTimer;

/// Everything the loop tasks read and write.
pub struct LiftState {
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) samples: SampleHandle,
    pub(crate) engine: StepEngine<Box<dyn StepDriver>>,
    pub(crate) mapper: SpeedMapper,
    pub(crate) breaks: Box<dyn BreakSensor>,
    pub(crate) inputs: Box<dyn InputReader>,
    pub(crate) sink: Box<dyn DiagnosticSink>,
    pub(crate) cfg: LoopCfg,
    pub(crate) hold: ElapsedTimer,
    pub(crate) diag: ElapsedTimer,
    pub(crate) now_ms: u32,
    pub(crate) raw: u32,
    pub(crate) input_pressed: bool,
    pub(crate) mode: LoopMode,
    pub(crate) breaks_seen: u64,
    pub(crate) resumes: u64,
    pub(crate) last_break: Option<u8>,
}

fn read_inputs(s: &mut LiftState) {
    s.now_ms = s.clock.now_ms();
    s.raw = s.samples.get();
    // Every channel is read each iteration, pressed or not.
    let mut pressed = false;
    for &ch in &s.cfg.input_channels {
        pressed |= s.inputs.is_pressed(ch);
    }
    s.input_pressed = pressed;
}

fn check_break(s: &mut LiftState) {
    let Some(position) = s.breaks.poll() else {
        return;
    };
    s.mode = LoopMode::Paused;
    s.engine.stop();
    s.hold.reset(s.now_ms, s.cfg.hold_ms);
    s.breaks_seen = s.breaks_seen.saturating_add(1);
    s.last_break = Some(position);
    s.sink.emit(&Diagnostic::Break { position });
}

fn check_resume(s: &mut LiftState) {
    if s.mode != LoopMode::Paused || !s.hold.is_expired(s.now_ms) || !s.input_pressed {
        return;
    }
    s.mode = LoopMode::Active;
    s.hold.disarm();
    s.engine.resume(s.now_ms);
    s.resumes = s.resumes.saturating_add(1);
    s.sink.emit(&Diagnostic::Resumed);
}

fn apply_speed(s: &mut LiftState) {
    // The filter keeps tracking the knob while paused.
    let period_ms = s.mapper.update(s.raw);
    if s.mode == LoopMode::Active {
        s.engine.set_period_ms(period_ms);
        s.engine.set_direction(s.cfg.direction);
    }
}

fn step(s: &mut LiftState) {
    s.engine.task(s.now_ms);
}

fn diagnostics(s: &mut LiftState) {
    if !s.diag.is_expired(s.now_ms) {
        return;
    }
    s.diag.reset(s.now_ms, s.cfg.diag_interval_ms);
    s.sink.emit(&Diagnostic::Snapshot {
        raw: s.raw,
        filtered: s.mapper.filtered_sample(),
        period_ms: s.mapper.current_period_ms(),
        paused: s.mode == LoopMode::Paused,
        steps: s.engine.steps(),
    });
}

fn loop_tasks() -> [Task<LiftState>; 6] {
    [
        Task::new("read_inputs", read_inputs),
        Task::new("check_break", check_break),
        Task::new("check_resume", check_resume),
        Task::new("apply_speed", apply_speed),
        Task::new("step", step),
        Task::new("diagnostics", diagnostics),
    ]
}

/// The assembled loop. Build it with [`crate::LiftBuilder`].
pub struct ControlLoop {
    state: LiftState,
    scheduler: Scheduler<LiftState>,
}

impl core::fmt::Debug for ControlLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("mode", &self.state.mode)
            .field("now_ms", &self.state.now_ms)
            .field("engine", &self.state.engine)
            .field("cycles", &self.scheduler.cycles())
            .finish()
    }
}

impl ControlLoop {
    pub(crate) fn new(state: LiftState) -> Self {
        Self {
            state,
            scheduler: Scheduler::new(loop_tasks()),
        }
    }

    pub fn builder() -> crate::builder::LiftBuilder<
        crate::builder::Missing,
        crate::builder::Missing,
        crate::builder::Missing,
    > {
        crate::builder::LiftBuilder::default()
    }

    /// Run one iteration of every task.
    #[inline]
    pub fn tick(&mut self) {
        self.scheduler.run_cycle(&mut self.state);
    }

    /// Stop the motor and release the coils, e.g. on shutdown. The loop stays
    /// usable; a later break/resume cycle restarts it.
    pub fn halt(&mut self) {
        self.state.engine.stop();
    }

    /// Sleep on the loop's clock.
    pub fn idle(&self, d: Duration) {
        self.state.clock.sleep(d);
    }

    /// Fresh reading of the loop's clock.
    pub fn clock_ms(&self) -> u32 {
        self.state.clock.now_ms()
    }

    /// Tick captured at the start of the last iteration.
    pub fn now_ms(&self) -> u32 {
        self.state.now_ms
    }

    pub fn mode(&self) -> LoopMode {
        self.state.mode
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.state.mode == LoopMode::Paused
    }

    pub fn engine(&self) -> &StepEngine<Box<dyn StepDriver>> {
        &self.state.engine
    }

    pub fn mapper(&self) -> &SpeedMapper {
        &self.state.mapper
    }

    pub fn hold_timer(&self) -> &ElapsedTimer {
        &self.state.hold
    }

    /// Raw sample read in the last iteration.
    pub fn raw(&self) -> u32 {
        self.state.raw
    }

    pub fn breaks_seen(&self) -> u64 {
        self.state.breaks_seen
    }

    pub fn resumes(&self) -> u64 {
        self.state.resumes
    }

    /// Floor of the most recent beam break.
    pub fn last_break(&self) -> Option<u8> {
        self.state.last_break
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        self.scheduler.task_names().collect()
    }

    pub fn cycles(&self) -> u64 {
        self.scheduler.cycles()
    }

    pub fn config(&self) -> &LoopCfg {
        &self.state.cfg
    }
}
