use std::time::{Duration, Instant};

/// Busy-wait for `d`.
///
/// Step pulses are a few microseconds wide, well below the granularity of
/// `thread::sleep`, so the pin is held by spinning on the monotonic clock.
#[inline]
pub fn spin_for(d: Duration) {
    if d.is_zero() {
        return;
    }
    let start = Instant::now();
    while start.elapsed() < d {
        std::hint::spin_loop();
    }
}
