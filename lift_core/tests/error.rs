use std::error::Error;

use lift_core::error::LiftError;
use lift_core::hw_error::map_hw_error;
use lift_core::mocks::{NullSink, RecordingSink};
use lift_core::{ControlLoop, sample_channel};
use lift_hardware::{ScriptedBreakSensor, SimulatedButtons};
use lift_traits::{Diagnostic, Direction, ManualClock, StepDriver};

/// A driver that accepts a few pulses, then reports a stuck step line; releases always fail.
struct FlakyDriver {
    ok_left: u32,
}

impl StepDriver for FlakyDriver {
    fn pulse(&mut self, _dir: Direction) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.ok_left == 0 {
            return Err("step line stuck".into());
        }
        self.ok_left -= 1;
        Ok(())
    }
    fn release(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Err("enable pin write timeout".into())
    }
    fn energize(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

#[test]
fn driver_failures_never_stop_the_loop() {
    let clock = ManualClock::new();
    let (_writer, samples) = sample_channel(3300);
    let breaks = ScriptedBreakSensor::new();
    let trigger = breaks.trigger();
    let sink = RecordingSink::new();
    let mut ctl = ControlLoop::builder()
        .with_driver(FlakyDriver { ok_left: 3 })
        .with_break_sensor(breaks)
        .with_inputs(SimulatedButtons::new(3))
        .with_samples(samples)
        .with_clock(clock.clone())
        .with_sink(sink.clone())
        .build()
        .unwrap();

    for t in 0..=100 {
        clock.set(t);
        ctl.tick();
    }
    assert_eq!(ctl.engine().steps(), 3);
    assert!(ctl.engine().faults() > 0);

    // A failing release still leaves the car logically stopped.
    trigger.trip(1);
    clock.set(101);
    ctl.tick();
    assert!(ctl.is_paused());
    assert!(!ctl.engine().is_running());
    assert_eq!(sink.events().last(), Some(&Diagnostic::Break { position: 1 }));
}

#[test]
fn boundary_errors_map_to_lift_error() {
    let timeout: Box<dyn Error + Send + Sync> = "enable pin write timeout".into();
    assert!(matches!(map_hw_error(&*timeout), LiftError::Timeout));

    let other: Box<dyn Error + Send + Sync> = "step line stuck".into();
    match map_hw_error(&*other) {
        LiftError::Hardware(msg) => assert_eq!(msg, "step line stuck"),
        e => panic!("unexpected mapping: {e:?}"),
    }
}

#[test]
fn null_sink_loop_builds_with_defaults() {
    let (_writer, samples) = sample_channel(0);
    let ctl = ControlLoop::builder()
        .with_driver(FlakyDriver { ok_left: 0 })
        .with_break_sensor(ScriptedBreakSensor::new())
        .with_inputs(SimulatedButtons::new(3))
        .with_samples(samples)
        .with_sink(NullSink)
        .build()
        .unwrap();
    assert_eq!(ctl.config().hold_ms, 500);
    assert_eq!(ctl.mapper().config().max_period_ms, 10);
}
