use std::thread;
use std::time::Duration;

/// Clock abstraction for the explicit sleeps in the driver stack (reset
/// hold, reset-retry backoff, calibration waits). Tests substitute a no-op
/// implementation so those waits cost no wall time.
pub trait Clock {
    fn sleep(&self, d: Duration);
}

/// Default, real-time clock backed by std::thread::sleep.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}
