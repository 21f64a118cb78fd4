use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lift_core::mocks::NullSink;
use lift_core::{ControlLoop, sample_channel};
use lift_hardware::{ScriptedBreakSensor, SimulatedButtons, SimulatedStepDriver};
use lift_traits::ManualClock;

fn bench_tick(c: &mut Criterion) {
    let clock = ManualClock::new();
    let (mut writer, samples) = sample_channel(1700);
    let mut ctl = ControlLoop::builder()
        .with_driver(SimulatedStepDriver::new())
        .with_break_sensor(ScriptedBreakSensor::new())
        .with_inputs(SimulatedButtons::new(3))
        .with_samples(samples)
        .with_clock(clock.clone())
        .with_sink(NullSink)
        .build()
        .expect("valid loop");

    let mut raw = 100u32;
    c.bench_function("control_loop_tick", |b| {
        b.iter(|| {
            clock.advance(1);
            raw = if raw >= 3300 { 100 } else { raw + 7 };
            writer.publish(black_box(raw));
            ctl.tick();
        })
    });

    let trigger_sensor = ScriptedBreakSensor::new();
    let trigger = trigger_sensor.trigger();
    let (_w, samples) = sample_channel(1700);
    let mut paused = ControlLoop::builder()
        .with_driver(SimulatedStepDriver::new())
        .with_break_sensor(trigger_sensor)
        .with_inputs(SimulatedButtons::new(3))
        .with_samples(samples)
        .with_clock(clock.clone())
        .with_sink(NullSink)
        .build()
        .expect("valid loop");
    trigger.trip(0);
    paused.tick();
    c.bench_function("control_loop_tick_paused", |b| {
        b.iter(|| {
            clock.advance(1);
            paused.tick();
            black_box(paused.is_paused())
        })
    });
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
