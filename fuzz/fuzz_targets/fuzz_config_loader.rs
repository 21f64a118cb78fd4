#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    let Ok(cfg) = lift_config::load_toml(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }
    // A config that validates must also construct a mapper and survive extreme samples.
    let speed: lift_core::SpeedMapperConfig = (&cfg.speed).into();
    let mut mapper = match lift_core::SpeedMapper::new(speed) {
        Ok(m) => m,
        Err(e) => panic!("validated config rejected by SpeedMapper: {e}"),
    };
    for raw in [0, cfg.speed.adc_min, cfg.speed.adc_max, u32::MAX] {
        let p = mapper.update(raw);
        assert!(p >= cfg.speed.min_period_ms && p <= cfg.speed.max_period_ms);
    }
    let control: lift_core::LoopCfg = (&cfg.control).into();
    if let Err(e) = control.validate() {
        panic!("validated config rejected by LoopCfg: {e}");
    }
});
