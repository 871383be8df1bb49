/*!
 * Signals Module
 * Process-wide signal registration, masking, and synchronous wait
 */

mod os;
mod registry;
mod set;
pub mod types;

// Re-export public API
pub use registry::SignalRegistry;
pub use set::SignalSet;
pub use types::{HandlerFn, SigCode, SignalError, SignalResult, NSIG};
