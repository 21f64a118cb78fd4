use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Millisecond tick source shared by the control loop, timers and the step engine.
///
/// - now_ms(): free-running tick that wraps at `u32::MAX` (about 49.7 days)
/// - sleep(): sleeps for the provided duration (implementations may simulate)
/// - ms_since(): elapsed ticks since an earlier `now_ms()` reading, wraparound-safe
pub trait Clock {
    fn now_ms(&self) -> u32;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch_ms`, computed with wrapping subtraction.
    fn ms_since(&self, epoch_ms: u32) -> u32 {
        self.now_ms().wrapping_sub(epoch_ms)
    }
}

/// Real-time clock backed by `std::time::Instant`, counting from its creation.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now_ms(&self) -> u32 {
        // Truncation is the wrap.
        self.origin.elapsed().as_millis() as u32
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

/// Deterministic clock whose tick is moved by hand.
///
/// Clones share the same tick, so a test can keep one handle and give another to the
/// component under test. `sleep(d)` advances the tick instead of blocking.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU32>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the tick at an arbitrary value (e.g. just below the wrap point).
    pub fn starting_at(ms: u32) -> Self {
        Self {
            now: Arc::new(AtomicU32::new(ms)),
        }
    }

    /// Advance the tick by `ms`, wrapping like the hardware counter would.
    pub fn advance(&self, ms: u32) {
        let _ = self
            .now
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| {
                Some(t.wrapping_add(ms))
            });
    }

    pub fn set(&self, ms: u32) {
        self.now.store(ms, Ordering::Release);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.load(Ordering::Acquire)
    }

    fn sleep(&self, d: Duration) {
        let ms = u32::try_from(d.as_millis()).unwrap_or(u32::MAX);
        self.advance(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let a = ManualClock::new();
        let b = a.clone();
        a.advance(250);
        assert_eq!(b.now_ms(), 250);
        b.sleep(Duration::from_millis(50));
        assert_eq!(a.now_ms(), 300);
    }

    #[test]
    fn ms_since_survives_wraparound() {
        let clock = ManualClock::starting_at(u32::MAX - 9);
        let epoch = clock.now_ms();
        clock.advance(20);
        assert_eq!(clock.now_ms(), 10);
        assert_eq!(clock.ms_since(epoch), 20);
    }

    #[test]
    fn monotonic_clock_moves_forward() {
        let clock = MonotonicClock::new();
        let t0 = clock.now_ms();
        clock.sleep(Duration::from_millis(5));
        assert!(clock.ms_since(t0) >= 5);
    }
}
