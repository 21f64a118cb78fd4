use lift_core::{LoopCfg, SamplerCfg, SpeedMapperConfig};
use lift_traits::Direction;

#[test]
fn toml_sections_convert_to_core_configs() {
    let cfg = lift_config::load_toml(
        r#"
[speed]
adc_min = 50
adc_max = 4000
min_period_ms = 2
max_period_ms = 20
ramp_ms = 3
invert = false
filter_shift = 0

[control]
hold_ms = 750
diag_interval_ms = 250
buttons = [1, 3]
direction = "ccw"

[sampler]
rate_hz = 500
timeout_ms = 4
"#,
    )
    .unwrap();

    let speed: SpeedMapperConfig = (&cfg.speed).into();
    assert_eq!(
        speed,
        SpeedMapperConfig {
            adc_min: 50,
            adc_max: 4000,
            min_period_ms: 2,
            max_period_ms: 20,
            ramp_step_ms: 3,
            invert: false,
            filter_shift: 0,
        }
    );

    let control: LoopCfg = (&cfg.control).into();
    assert_eq!(control.hold_ms, 750);
    assert_eq!(control.diag_interval_ms, 250);
    assert_eq!(control.input_channels, vec![1, 3]);
    assert_eq!(control.direction, Direction::Ccw);

    let sampler: SamplerCfg = (&cfg.sampler).into();
    assert_eq!((sampler.rate_hz, sampler.timeout_ms), (500, 4));
}

#[test]
fn default_sections_match_core_defaults() {
    let cfg = lift_config::Config::default();
    let speed: SpeedMapperConfig = (&cfg.speed).into();
    assert_eq!(speed, SpeedMapperConfig::default());
    let control: LoopCfg = (&cfg.control).into();
    let core = LoopCfg::default();
    assert_eq!(control.hold_ms, core.hold_ms);
    assert_eq!(control.input_channels, core.input_channels);
    assert_eq!(control.direction, core.direction);
}
