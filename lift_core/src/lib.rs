#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core lift control logic (hardware-agnostic).
//!
//! This crate provides the cooperative control loop for a stepper-driven
//! lift car. All hardware interactions go through the `lift_traits` seams
//! (`StepDriver`, `BreakSensor`, `InputReader`, `AnalogInput`, `Clock`).
//!
//! ## Architecture
//!
//! - **Timing**: wraparound-safe countdowns on a `u32` ms tick (`timer`)
//! - **Speed**: clamp, integer EMA, linear map and ramp of the knob sample (`speed`)
//! - **Motion**: one-pulse-per-tick step pacing (`stepper`)
//! - **Scheduling**: fixed ordered task list (`scheduler`), driven by `control`
//! - **Safety**: beam break stops the car; resume needs the hold to expire and an input
//! - **Sampling**: single-producer shared sample written by a background thread (`sampler`)
//!
//! ## Time
//!
//! All time arithmetic uses `wrapping_sub` on the millisecond tick, so the
//! loop keeps working across the `u32` wraparound (about 49.7 days).

pub mod builder;
pub mod config;
pub mod control;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod logger;
pub mod mocks;
pub mod runner;
pub mod sampler;
pub mod scheduler;
pub mod speed;
pub mod status;
pub mod stepper;
pub mod timer;
pub mod util;

pub use builder::{LiftBuilder, Missing, Set};
pub use config::{LoopCfg, SamplerCfg};
pub use control::{ControlLoop, LiftState};
pub use error::{BuildError, ConfigError, LiftError, Report, Result};
pub use logger::TracingSink;
pub use runner::{RunParams, RunStats};
pub use sampler::{SampleHandle, SampleWriter, Sampler, sample_channel};
pub use scheduler::{Scheduler, Task};
pub use speed::{SpeedMapper, SpeedMapperConfig};
pub use status::{EngineState, LoopMode};
pub use stepper::StepEngine;
pub use timer::ElapsedTimer;
