use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::control::ControlLoop;
use crate::sampler::Sampler;

/// Compute the sampler stall threshold in milliseconds.
///
/// Parameters:
/// - `sensor_timeout_ms`: the per-conversion timeout. A stall is suspected after four of them.
/// - `period_ms`: the sampling period derived from `rate_hz`. The threshold always spans at
///   least two periods so that a single missed conversion doesn't trip it.
#[inline]
pub fn stall_threshold_ms(sensor_timeout_ms: u64, period_ms: u64) -> u32 {
    let fast = sensor_timeout_ms.saturating_mul(4);
    let two_p = period_ms.saturating_mul(2);
    u32::try_from(fast.max(two_p)).unwrap_or(u32::MAX).max(1)
}

/// Knobs for [`run`].
#[derive(Debug, Clone)]
pub struct RunParams {
    /// Sleep between iterations on the loop clock; zero spins.
    pub idle: Duration,
    /// Stop after this many milliseconds of loop time.
    pub max_duration_ms: Option<u32>,
    /// Iterations slower than this are counted in `RunStats::over_budget`.
    pub tick_budget: Duration,
    /// See [`stall_threshold_ms`].
    pub stall_threshold_ms: u32,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            idle: Duration::from_micros(200),
            max_duration_ms: None,
            tick_budget: Duration::from_micros(500),
            stall_threshold_ms: stall_threshold_ms(10, 1),
        }
    }
}

/// Summary of one [`run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub iterations: u64,
    pub steps: u64,
    pub faults: u64,
    pub breaks: u64,
    pub resumes: u64,
    /// Loop-clock milliseconds between start and stop.
    pub elapsed_ms: u32,
    pub tick_min_us: u64,
    pub tick_avg_us: u64,
    pub tick_max_us: u64,
    pub over_budget: u64,
    /// Distinct sampler stall episodes observed.
    pub stalls: u64,
}

#[derive(Default)]
struct Latency {
    min: u64,
    max: u64,
    total: u128,
    n: u64,
    over: u64,
}

impl Latency {
    fn record(&mut self, us: u64, budget_us: u64) {
        self.min = if self.n == 0 { us } else { self.min.min(us) };
        self.max = self.max.max(us);
        self.total += u128::from(us);
        self.n += 1;
        if us > budget_us {
            self.over += 1;
        }
    }

    fn avg(&self) -> u64 {
        if self.n == 0 {
            return 0;
        }
        u64::try_from(self.total / u128::from(self.n)).unwrap_or(u64::MAX)
    }
}

/// Tick `ctl` until `shutdown` is set or `max_duration_ms` of loop time passes.
///
/// A stalled sampler is reported once per episode and never stops the loop;
/// the speed path keeps using the last published sample. The motor is halted
/// before returning.
pub fn run(
    ctl: &mut ControlLoop,
    shutdown: &AtomicBool,
    params: &RunParams,
    sampler: Option<&Sampler>,
) -> RunStats {
    let budget_us = u64::try_from(params.tick_budget.as_micros()).unwrap_or(u64::MAX);
    let start_ms = ctl.clock_ms();
    let mut lat = Latency::default();
    let mut stalled = false;
    let mut stalls = 0u64;

    tracing::info!(
        idle_us = u64::try_from(params.idle.as_micros()).unwrap_or(u64::MAX),
        max_duration_ms = ?params.max_duration_ms,
        "lift loop start"
    );

    while !shutdown.load(Ordering::Relaxed) {
        let t0 = Instant::now();
        ctl.tick();
        let us = u64::try_from(t0.elapsed().as_micros()).unwrap_or(u64::MAX);
        lat.record(us, budget_us);

        let now = ctl.now_ms();
        if let Some(s) = sampler {
            let stalled_for = s.stalled_for(now);
            let is_stalled = stalled_for > params.stall_threshold_ms;
            if is_stalled && !stalled {
                stalls += 1;
                tracing::warn!(
                    stalled_ms = stalled_for,
                    threshold_ms = params.stall_threshold_ms,
                    "analog sampler stalled; holding last sample"
                );
            } else if !is_stalled && stalled {
                tracing::info!("analog sampler recovered");
            }
            stalled = is_stalled;
        }

        if let Some(max) = params.max_duration_ms {
            if now.wrapping_sub(start_ms) >= max {
                break;
            }
        }
        if !params.idle.is_zero() {
            ctl.idle(params.idle);
        }
    }

    ctl.halt();

    let stats = RunStats {
        iterations: lat.n,
        steps: ctl.engine().steps(),
        faults: ctl.engine().faults(),
        breaks: ctl.breaks_seen(),
        resumes: ctl.resumes(),
        elapsed_ms: ctl.clock_ms().wrapping_sub(start_ms),
        tick_min_us: lat.min,
        tick_avg_us: lat.avg(),
        tick_max_us: lat.max,
        over_budget: lat.over,
        stalls,
    };
    tracing::info!(
        iterations = stats.iterations,
        steps = stats.steps,
        breaks = stats.breaks,
        resumes = stats.resumes,
        elapsed_ms = stats.elapsed_ms,
        mode = ctl.mode().as_str(),
        "lift loop stop"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    // fast threshold dominates
    #[case(10, 1, 40)]
    // two periods dominate for slow sampling
    #[case(1, 100, 200)]
    #[case(0, 0, 1)]
    #[case(u64::MAX, 1, u32::MAX)]
    fn stall_threshold_cases(#[case] timeout: u64, #[case] period: u64, #[case] expected: u32) {
        assert_eq!(stall_threshold_ms(timeout, period), expected);
    }

    #[test]
    fn latency_tracks_min_avg_max_and_budget() {
        let mut l = Latency::default();
        l.record(10, 15);
        l.record(20, 15);
        l.record(30, 15);
        assert_eq!((l.min, l.avg(), l.max, l.over), (10, 20, 30, 2));
    }
}
