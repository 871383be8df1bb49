/*!
 * Delay
 * Sleep for a requested duration, tolerating early wakeups
 */

use super::clock::{Clock, OsClock};

/// Sleep for `requested_ms` against the host clock and report the actual
/// elapsed time in milliseconds.
///
/// Never fails: an interrupted sleep is simply retried with the recomputed
/// remaining time. The result can slightly exceed the request due to
/// scheduling granularity; it will not be less than it.
pub fn delay(requested_ms: u32) -> u32 {
    delay_with(&OsClock, requested_ms)
}

/// Delay loop over an injected clock.
///
/// Arithmetic wraps at the `u32` boundary, so the loop stays correct across
/// clock wrap-around for any request below half the range.
pub fn delay_with(clock: &impl Clock, requested_ms: u32) -> u32 {
    let start = clock.now_ms();
    let expires = start.wrapping_add(requested_ms);
    let mut current = start;

    loop {
        let left = expires.wrapping_sub(current) as i32;
        if left <= 0 {
            break;
        }

        clock.sleep_ms(left as u32);
        current = clock.now_ms();
    }

    current.wrapping_sub(start)
}
