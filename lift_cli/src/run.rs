//! Hardware assembly and loop execution for `run` and `self-check`.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use eyre::WrapErr;
use lift_core::runner::{RunParams, RunStats, stall_threshold_ms};
use lift_core::{ControlLoop, LoopCfg, Sampler, SamplerCfg, SpeedMapperConfig, sample_channel};
use lift_traits::{AnalogInput, BreakSensor, InputReader, MonotonicClock, StepDriver};

/// Options of the `run` subcommand after parsing.
#[derive(Debug, Clone, Default)]
pub struct RunOpts {
    pub duration_ms: Option<u32>,
    pub idle_us: Option<u64>,
    pub stats: bool,
    pub sim: SimOpts,
}

/// Knobs for the simulated backend; ignored on hardware.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimOpts {
    pub adc: Option<u32>,
    pub break_every_ms: Option<u32>,
    pub press_every_ms: Option<u32>,
}

/// Floors cycled through by the simulated beam breaks.
const SIM_FLOORS: u8 = 4;
/// How long a simulated button press lasts.
const SIM_PRESS_WIDTH_MS: u32 = 50;

/// A fully wired loop plus the sampler feeding it.
pub struct Assembled {
    pub ctl: ControlLoop,
    pub sampler: Sampler,
    pub backend: &'static str,
}

fn wire<A, D, B, I>(
    cfg: &lift_config::Config,
    clock: MonotonicClock,
    adc: A,
    driver: D,
    breaks: B,
    inputs: I,
) -> eyre::Result<(ControlLoop, Sampler)>
where
    A: AnalogInput + Send + 'static,
    D: StepDriver + 'static,
    B: BreakSensor + 'static,
    I: InputReader + 'static,
{
    let speed: SpeedMapperConfig = (&cfg.speed).into();
    let loop_cfg: LoopCfg = (&cfg.control).into();
    let sampler_cfg: SamplerCfg = (&cfg.sampler).into();

    let (writer, samples) = sample_channel(speed.slowest_sample());
    let sampler = Sampler::spawn(adc, writer, &sampler_cfg, clock)?;
    let ctl = ControlLoop::builder()
        .with_driver(driver)
        .with_break_sensor(breaks)
        .with_inputs(inputs)
        .with_samples(samples)
        .with_speed(speed)
        .with_loop(loop_cfg)
        .with_clock(clock)
        .try_build()?;
    Ok((ctl, sampler))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub fn assemble(cfg: &lift_config::Config, sim: SimOpts) -> eyre::Result<Assembled> {
    use lift_hardware::{
        PeriodicBreakSensor, PulsedButtons, ScriptedBreakSensor, SimulatedAnalog, SimulatedButtons,
        SimulatedStepDriver,
    };

    let clock = MonotonicClock::new();
    let adc = match sim.adc {
        Some(v) => SimulatedAnalog::constant(v),
        None => SimulatedAnalog::sweep(cfg.speed.adc_min, cfg.speed.adc_max, 4),
    };
    let breaks: Box<dyn BreakSensor> = match sim.break_every_ms {
        Some(every) => Box::new(PeriodicBreakSensor::new(clock, every, SIM_FLOORS)),
        None => Box::new(ScriptedBreakSensor::new()),
    };
    let channels = cfg.control.buttons.iter().copied().max().map_or(1, |m| usize::from(m) + 1);
    let inputs: Box<dyn InputReader> = match sim.press_every_ms {
        Some(every) => {
            let channel = cfg.control.buttons.first().copied().unwrap_or(0);
            Box::new(PulsedButtons::new(clock, channel, every, SIM_PRESS_WIDTH_MS))
        }
        None => Box::new(SimulatedButtons::new(channels)),
    };
    tracing::info!(
        adc = ?sim.adc,
        break_every_ms = ?sim.break_every_ms,
        press_every_ms = ?sim.press_every_ms,
        "using simulated hardware"
    );

    let (ctl, sampler) = wire(cfg, clock, adc, SimulatedStepDriver::new(), breaks, inputs)?;
    Ok(Assembled {
        ctl,
        sampler,
        backend: "sim",
    })
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn assemble(cfg: &lift_config::Config, _sim: SimOpts) -> eyre::Result<Assembled> {
    use lift_hardware::gpio::{GpioBreakSensor, GpioButtons, GpioStepDriver};
    use lift_hardware::mcp3208::Mcp3208;

    let pins = cfg
        .pins
        .as_ref()
        .ok_or_else(|| eyre::eyre!("invalid configuration: [pins] section is missing"))?;
    let adc = Mcp3208::new(pins.adc_bus, pins.adc_ss, pins.adc_channel).wrap_err("open adc")?;
    let driver =
        GpioStepDriver::new(pins.motor_step, pins.motor_dir, pins.motor_en).wrap_err("open motor pins")?;
    let breaks = GpioBreakSensor::new(&pins.photo, pins.photo_active_low)
        .wrap_err("open photo-interrupter pins")?;
    let inputs = GpioButtons::new(&pins.buttons).wrap_err("open button pins")?;
    tracing::info!(
        step = pins.motor_step,
        dir = pins.motor_dir,
        floors = pins.photo.len(),
        "using GPIO hardware"
    );

    let (ctl, sampler) = wire(cfg, MonotonicClock::new(), adc, driver, breaks, inputs)?;
    Ok(Assembled {
        ctl,
        sampler,
        backend: "hardware",
    })
}

/// Loop parameters derived from config, with CLI overrides applied.
pub fn run_params(cfg: &lift_config::Config, opts: &RunOpts) -> RunParams {
    let period_ms = lift_core::util::period_ms(cfg.sampler.rate_hz);
    RunParams {
        idle: Duration::from_micros(opts.idle_us.unwrap_or(cfg.runner.idle_us)),
        max_duration_ms: opts.duration_ms,
        tick_budget: Duration::from_micros(lift_core::util::period_us(cfg.sampler.rate_hz)),
        stall_threshold_ms: stall_threshold_ms(cfg.sampler.timeout_ms, period_ms),
    }
}

pub fn run(
    cfg: &lift_config::Config,
    opts: &RunOpts,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<RunStats> {
    let mut hw = assemble(cfg, opts.sim).wrap_err("assemble lift")?;
    let params = run_params(cfg, opts);
    tracing::info!(backend = hw.backend, "lift start");
    let stats = lift_core::runner::run(&mut hw.ctl, &shutdown, &params, Some(&hw.sampler));
    tracing::debug!(
        conversions = hw.sampler.conversions(),
        adc_errors = hw.sampler.errors(),
        "sampler totals"
    );
    Ok(stats)
}

/// Assemble for a check: the builder starts the engine, so halt it again to
/// leave the coils released.
fn assemble_halted(cfg: &lift_config::Config) -> eyre::Result<Assembled> {
    let mut hw = assemble(cfg, SimOpts::default()).wrap_err("assemble lift")?;
    hw.ctl.halt();
    Ok(hw)
}

/// Build every component, then tear it down again.
pub fn self_check(cfg: &lift_config::Config) -> eyre::Result<&'static str> {
    let hw = assemble_halted(cfg)?;
    tracing::info!(
        backend = hw.backend,
        tasks = ?hw.ctl.task_names(),
        "self-check passed"
    );
    Ok(hw.backend)
}

pub fn print_stats(stats: &RunStats, tick_budget: Duration) {
    eprintln!("\n--- Lift Stats ---");
    eprintln!("Iterations: {}", stats.iterations);
    eprintln!("Elapsed (ms): {}", stats.elapsed_ms);
    eprintln!("Steps / faults: {} / {}", stats.steps, stats.faults);
    eprintln!("Breaks / resumes: {} / {}", stats.breaks, stats.resumes);
    eprintln!(
        "Tick min/avg/max (us): {} / {} / {}",
        stats.tick_min_us, stats.tick_avg_us, stats.tick_max_us
    );
    eprintln!(
        "Over budget (> {} us): {}",
        tick_budget.as_micros(),
        stats.over_budget
    );
    eprintln!("Sampler stalls: {}", stats.stalls);
    eprintln!("------------------\n");
}

pub fn stats_json(stats: &RunStats) -> serde_json::Value {
    serde_json::json!({
        "event": "run_complete",
        "iterations": stats.iterations,
        "elapsed_ms": stats.elapsed_ms,
        "steps": stats.steps,
        "faults": stats.faults,
        "breaks": stats.breaks,
        "resumes": stats.resumes,
        "stalls": stats.stalls,
        "tick_us": {
            "min": stats.tick_min_us,
            "avg": stats.tick_avg_us,
            "max": stats.tick_max_us,
        },
        "over_budget": stats.over_budget,
    })
}
