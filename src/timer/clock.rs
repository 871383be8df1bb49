/*!
 * Monotonic Clock
 * Millisecond view of the host monotonic timer, plus the sleep seam the
 * delay loop runs against
 */

use std::sync::OnceLock;
use std::time::Instant;

/// Milliseconds on the process monotonic clock, counted from an arbitrary
/// process-local origin and wrapping at the `u32` boundary.
pub fn now_ms() -> u32 {
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    ORIGIN.get_or_init(Instant::now).elapsed().as_millis() as u32
}

/// Time source for a delay loop
pub trait Clock {
    /// Wrapping millisecond read of the monotonic clock
    fn now_ms(&self) -> u32;

    /// Sleep for at most `ms`. Returning early is fine; callers re-read the
    /// clock and loop.
    fn sleep_ms(&self, ms: u32);
}

/// Host clock: the process monotonic timer plus `nanosleep`
pub struct OsClock;

impl Clock for OsClock {
    fn now_ms(&self) -> u32 {
        now_ms()
    }

    fn sleep_ms(&self, ms: u32) {
        let request = libc::timespec {
            tv_sec: (ms / 1000) as libc::time_t,
            tv_nsec: ((ms % 1000) as libc::c_long) * 1_000_000,
        };

        // An interrupted sleep is not resumed here; the delay loop recomputes
        // the remaining time from the clock instead.
        unsafe {
            libc::nanosleep(&request, std::ptr::null_mut());
        }
    }
}
