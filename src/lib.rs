/*!
 * sigport
 * Portable user-space signal delivery and delay services
 *
 * Gives an application a uniform signal-handling model over the host's
 * native POSIX API: register a set of installed signals, block and unblock
 * them as a group, and consume them either through a callback or by
 * synchronously waiting with a timeout.
 */

#[cfg(not(unix))]
compile_error!("sigport requires a POSIX-style signal API and only builds on Unix targets");

pub mod signals;
pub mod timer;

// Re-export public API
pub use signals::{HandlerFn, SigCode, SignalError, SignalRegistry, SignalResult, SignalSet, NSIG};
pub use timer::{delay, delay_with, now_ms, Clock, OsClock};
