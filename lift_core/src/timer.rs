//! Non-blocking countdown on the wrapping millisecond tick.

/// Countdown armed with a duration and polled for expiry.
///
/// Expiry is computed as `now - start >= duration` in wrapping `u32` arithmetic,
/// so a countdown that straddles the tick wraparound behaves like any other.
/// The caller passes `now` from its `Clock`; the timer never reads time itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElapsedTimer {
    start_ms: u32,
    duration_ms: u32,
    armed: bool,
}

impl ElapsedTimer {
    /// A disarmed timer. `is_expired` is false until it is armed.
    pub const fn new() -> Self {
        Self {
            start_ms: 0,
            duration_ms: 0,
            armed: false,
        }
    }

    /// Start a countdown of `duration_ms` from `now`, replacing any previous one.
    pub fn arm(&mut self, now: u32, duration_ms: u32) {
        self.start_ms = now;
        self.duration_ms = duration_ms;
        self.armed = true;
    }

    /// Restart the countdown from `now`. Same as `arm`; named for the re-trigger case.
    #[inline]
    pub fn reset(&mut self, now: u32, duration_ms: u32) {
        self.arm(now, duration_ms);
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// True once armed and the duration has fully elapsed. Stays true until re-armed.
    #[inline]
    pub fn is_expired(&self, now: u32) -> bool {
        self.armed && now.wrapping_sub(self.start_ms) >= self.duration_ms
    }

    /// Milliseconds left before expiry; 0 when expired or disarmed.
    pub fn remaining_ms(&self, now: u32) -> u32 {
        if !self.armed {
            return 0;
        }
        self.duration_ms
            .saturating_sub(now.wrapping_sub(self.start_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disarmed_timer_never_expires() {
        let t = ElapsedTimer::new();
        assert!(!t.is_armed());
        assert!(!t.is_expired(0));
        assert!(!t.is_expired(u32::MAX));
        assert_eq!(t.remaining_ms(10), 0);
    }

    #[test]
    fn expires_exactly_at_duration_and_stays_expired() {
        let mut t = ElapsedTimer::new();
        t.arm(1_000, 500);
        assert!(!t.is_expired(1_499));
        assert_eq!(t.remaining_ms(1_499), 1);
        assert!(t.is_expired(1_500));
        assert!(t.is_expired(1_500));
        assert!(t.is_expired(9_000));
        assert_eq!(t.remaining_ms(9_000), 0);
    }

    #[test]
    fn reset_restarts_from_now() {
        let mut t = ElapsedTimer::new();
        t.arm(0, 500);
        t.reset(400, 500);
        assert!(!t.is_expired(500));
        assert!(!t.is_expired(899));
        assert!(t.is_expired(900));
    }

    #[test]
    fn countdown_across_wraparound() {
        let mut t = ElapsedTimer::new();
        let start = u32::MAX - 100;
        t.arm(start, 500);
        // A naive `now >= start + duration` check would overflow here.
        assert!(!t.is_expired(start.wrapping_add(499)));
        assert!(t.is_expired(start.wrapping_add(500)));
        assert_eq!(t.remaining_ms(start.wrapping_add(200)), 300);
    }

    #[test]
    fn zero_duration_expires_immediately() {
        let mut t = ElapsedTimer::new();
        t.arm(42, 0);
        assert!(t.is_expired(42));
    }

    #[test]
    fn disarm_clears_expiry() {
        let mut t = ElapsedTimer::new();
        t.arm(0, 1);
        assert!(t.is_expired(5));
        t.disarm();
        assert!(!t.is_expired(5));
    }
}
