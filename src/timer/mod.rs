/*!
 * Timer Module
 * Monotonic millisecond clock and the delay retry loop
 */

mod clock;
mod delay;

pub use clock::{now_ms, Clock, OsClock};
pub use delay::{delay, delay_with};
