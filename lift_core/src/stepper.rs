//! Non-blocking step pulse generator.

use lift_traits::{Direction, StepDriver};

use crate::hw_error::map_hw_error;
use crate::status::EngineState;

/// Paces single step pulses against the millisecond tick.
///
/// `task` is called once per loop iteration and emits at most one pulse. The
/// schedule advances by exactly one period per pulse, so long-run cadence does
/// not drift with loop jitter; if the loop falls behind, the backlog is worked
/// off one pulse per call, never in a burst.
pub struct StepEngine<D: StepDriver> {
    driver: D,
    period_ms: u32,
    direction: Direction,
    running: bool,
    last_step_ms: u32,
    steps: u64,
    faults: u64,
}

impl<D: StepDriver> core::fmt::Debug for StepEngine<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StepEngine")
            .field("period_ms", &self.period_ms)
            .field("direction", &self.direction)
            .field("running", &self.running)
            .field("steps", &self.steps)
            .finish()
    }
}

impl<D: StepDriver> StepEngine<D> {
    /// New engine in the `Stopped` state.
    pub fn new(driver: D, period_ms: u32) -> Self {
        Self {
            driver,
            period_ms: period_ms.max(1),
            direction: Direction::default(),
            running: false,
            last_step_ms: 0,
            steps: 0,
            faults: 0,
        }
    }

    /// Stop immediately. Any step that was due is dropped. Idempotent.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        if let Err(e) = self.driver.release() {
            tracing::warn!(error = %map_hw_error(&*e), "driver release failed on stop");
        }
    }

    /// Start pacing from `now`. No-op while already running.
    pub fn resume(&mut self, now: u32) {
        if self.running {
            return;
        }
        if let Err(e) = self.driver.energize() {
            tracing::warn!(error = %map_hw_error(&*e), "driver energize failed on resume");
        }
        self.running = true;
        self.last_step_ms = now;
    }

    /// Change the period; takes effect from the next `task`. Floors at 1 ms.
    #[inline]
    pub fn set_period_ms(&mut self, period_ms: u32) {
        self.period_ms = period_ms.max(1);
    }

    #[inline]
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// One tick. Returns true when a pulse was emitted.
    pub fn task(&mut self, now: u32) -> bool {
        if !self.running {
            return false;
        }
        if now.wrapping_sub(self.last_step_ms) < self.period_ms {
            return false;
        }
        self.last_step_ms = self.last_step_ms.wrapping_add(self.period_ms);
        match self.driver.pulse(self.direction) {
            Ok(()) => {
                self.steps = self.steps.saturating_add(1);
                true
            }
            Err(e) => {
                self.faults = self.faults.saturating_add(1);
                if self.faults.is_power_of_two() {
                    tracing::warn!(
                        error = %map_hw_error(&*e),
                        faults = self.faults,
                        "step pulse failed"
                    );
                }
                false
            }
        }
    }

    pub fn state(&self) -> EngineState {
        if self.running {
            EngineState::Running
        } else {
            EngineState::Stopped
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Pulses emitted since construction (open-loop position proxy).
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Pulses the driver rejected.
    pub fn faults(&self) -> u64 {
        self.faults
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}
