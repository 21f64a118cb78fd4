//! Hardware seams for the lift controller.
//!
//! Every device the control loop talks to sits behind one of these traits so the
//! core stays hardware-agnostic and can be driven by simulated devices in tests.
pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Rotation direction of the car's stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Clockwise (the reference hoisting direction).
    #[default]
    Cw,
    Ccw,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Cw => "cw",
            Direction::Ccw => "ccw",
        }
    }
}

/// Analog converter sampled by the background sampler thread.
pub trait AnalogInput {
    /// Arm the converter. Called exactly once, before the first `read`.
    fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Return the next raw conversion, waiting at most `timeout` for it.
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<u32, Box<dyn std::error::Error + Send + Sync>>;
}

/// Position sensor reporting beam interruptions.
///
/// Edge-triggered: a physical interruption is reported once, on the poll that first
/// observes it. Returns `None` when no new interruption happened since the last poll.
pub trait BreakSensor {
    fn poll(&mut self) -> Option<u8>;
}

/// Discrete operator inputs (call buttons).
pub trait InputReader {
    fn is_pressed(&mut self, channel: u8) -> bool;
}

/// Step/direction motor driver.
pub trait StepDriver {
    /// Emit one step pulse in `dir`.
    fn pulse(&mut self, dir: Direction) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    /// De-energize the coils (holding torque off).
    fn release(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    /// Energize the coils before stepping resumes.
    fn energize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Record handed to a [`DiagnosticSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// The beam at `position` was interrupted; motion has been stopped.
    Break { position: u8 },
    /// An operator input acknowledged the stop after the hold period.
    Resumed,
    /// Periodic view of the speed path.
    Snapshot {
        raw: u32,
        filtered: u32,
        period_ms: u32,
        paused: bool,
        steps: u64,
    },
}

/// Fire-and-forget diagnostic output. Implementations must not block and must
/// swallow their own failures.
pub trait DiagnosticSink {
    fn emit(&mut self, event: &Diagnostic);
}

impl<T: StepDriver + ?Sized> StepDriver for Box<T> {
    fn pulse(&mut self, dir: Direction) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).pulse(dir)
    }
    fn release(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).release()
    }
    fn energize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).energize()
    }
}

impl<T: BreakSensor + ?Sized> BreakSensor for Box<T> {
    fn poll(&mut self) -> Option<u8> {
        (**self).poll()
    }
}

impl<T: InputReader + ?Sized> InputReader for Box<T> {
    fn is_pressed(&mut self, channel: u8) -> bool {
        (**self).is_pressed(channel)
    }
}
