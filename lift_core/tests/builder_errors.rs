use lift_core::error::{BuildError, ConfigError};
use lift_core::mocks::NullSink;
use lift_core::{ControlLoop, LoopCfg, SpeedMapperConfig, sample_channel};
use lift_hardware::{ScriptedBreakSensor, SimulatedButtons, SimulatedStepDriver};
use rstest::rstest;

#[rstest]
fn builder_missing_driver_yields_typed_build_error() {
    let err = ControlLoop::builder()
        // missing with_driver()
        .with_break_sensor(ScriptedBreakSensor::new())
        .with_inputs(SimulatedButtons::new(3))
        .try_build()
        .expect_err("should fail with MissingDriver");

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingDriver) => {}
        other => panic!("expected MissingDriver, got: {other:?}"),
    }
}

#[rstest]
fn builder_missing_break_sensor_yields_typed_build_error() {
    let err = ControlLoop::builder()
        .with_driver(SimulatedStepDriver::new())
        .try_build()
        .expect_err("should fail with MissingBreakSensor");

    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingBreakSensor)
    ));
}

#[rstest]
fn builder_missing_samples_yields_typed_build_error() {
    let err = ControlLoop::builder()
        .with_driver(SimulatedStepDriver::new())
        .with_break_sensor(ScriptedBreakSensor::new())
        .with_inputs(SimulatedButtons::new(3))
        .build()
        .expect_err("should fail with MissingSamples");

    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingSamples)
    ));
}

fn bad_speed(f: impl FnOnce(&mut SpeedMapperConfig)) -> SpeedMapperConfig {
    let mut c = SpeedMapperConfig::default();
    f(&mut c);
    c
}

fn bad_loop(f: impl FnOnce(&mut LoopCfg)) -> LoopCfg {
    let mut c = LoopCfg::default();
    f(&mut c);
    c
}

#[rstest]
#[case::adc_range(
    bad_speed(|c| c.adc_min = c.adc_max),
    LoopCfg::default(),
    ConfigError::AdcRange { min: 3300, max: 3300 }
)]
#[case::period_range(
    bad_speed(|c| c.min_period_ms = 20),
    LoopCfg::default(),
    ConfigError::PeriodRange { min: 20, max: 10 }
)]
#[case::zero_ramp(bad_speed(|c| c.ramp_step_ms = 0), LoopCfg::default(), ConfigError::ZeroRamp)]
#[case::filter_shift(bad_speed(|c| c.filter_shift = 9), LoopCfg::default(), ConfigError::FilterShift(9))]
#[case::zero_hold(SpeedMapperConfig::default(), bad_loop(|c| c.hold_ms = 0), ConfigError::ZeroHold)]
#[case::zero_diag(
    SpeedMapperConfig::default(),
    bad_loop(|c| c.diag_interval_ms = 0),
    ConfigError::ZeroDiagInterval
)]
#[case::no_inputs(
    SpeedMapperConfig::default(),
    bad_loop(|c| c.input_channels.clear()),
    ConfigError::NoInputs
)]
fn invalid_parameters_prevent_construction(
    #[case] speed: SpeedMapperConfig,
    #[case] cfg: LoopCfg,
    #[case] expected: ConfigError,
) {
    let (_writer, samples) = sample_channel(0);
    let err = ControlLoop::builder()
        .with_driver(SimulatedStepDriver::new())
        .with_break_sensor(ScriptedBreakSensor::new())
        .with_inputs(SimulatedButtons::new(3))
        .with_samples(samples)
        .with_speed(speed)
        .with_loop(cfg)
        .with_sink(NullSink)
        .build()
        .expect_err("invalid configuration");

    assert_eq!(err.downcast_ref::<ConfigError>(), Some(&expected));
}
