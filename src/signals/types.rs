/*!
 * Signal Types
 * Signal codes, handler callback type, and result types
 */

use nix::errno::Errno;
use thiserror::Error;

/// Signal code as seen by callers: the host signal number as a small integer.
pub type SigCode = u32;

/// Number of representable signal codes; valid codes are `0..NSIG`.
///
/// One bit per code in [`crate::signals::SignalSet`]. Covers the standard and
/// realtime range on the supported hosts.
pub const NSIG: SigCode = 64;

/// Signal operation result
pub type SignalResult<T> = Result<T, SignalError>;

/// Callback invoked with the code of every delivered signal.
///
/// Runs in the signal-delivery context when the signal arrives
/// asynchronously, so the body is held to the usual async-signal-safety
/// rules: no allocation, no locks, no blocking calls.
pub type HandlerFn = Box<dyn Fn(SigCode) + Send + Sync>;

/// Signal errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalError {
    #[error("signal registry not initialized")]
    NotInitialized,

    #[error("signal registry already owned by an earlier init")]
    AlreadyBusy,

    #[error("signal code {0} outside the representable range")]
    IllegalSignal(SigCode),

    #[error("timed out waiting for an installed signal")]
    Timeout,

    #[error("signal operation failed: {0}")]
    Os(#[from] Errno),
}
