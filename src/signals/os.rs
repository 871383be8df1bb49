/*!
 * OS Signal Glue
 * Every unsafe POSIX call in the crate: sigaction, sigprocmask,
 * sigtimedwait, and the trampoline the OS invokes on delivery
 */

use super::registry::SignalRegistry;
use super::set::SignalSet;
use super::types::{SigCode, SignalResult};
use nix::errno::Errno;
use std::mem::MaybeUninit;
use std::ptr;

/// Handler registered with the OS for every installed signal.
///
/// Runs in the signal-delivery context; the registry dispatch it forwards to
/// is written to stay async-signal-safe.
extern "C" fn forward_signal(code: libc::c_int) {
    SignalRegistry::global().dispatch(code as SigCode);
}

/// Convert a portable set to the host `sigset_t`.
fn to_os_set(set: &SignalSet) -> libc::sigset_t {
    let mut raw = MaybeUninit::<libc::sigset_t>::uninit();
    unsafe {
        libc::sigemptyset(raw.as_mut_ptr());
        for code in set.iter() {
            // Code 0 is not addressable in a sigset; the OS rejects it at
            // the operation itself.
            libc::sigaddset(raw.as_mut_ptr(), code as libc::c_int);
        }
        raw.assume_init()
    }
}

/// Point the OS disposition for `code` at the dispatch trampoline.
///
/// `no_block` is the mask applied while the handler body executes.
pub(crate) fn install_handler(code: SigCode, no_block: &SignalSet) -> SignalResult<()> {
    let trampoline: extern "C" fn(libc::c_int) = forward_signal;
    set_action(code, trampoline as libc::sighandler_t, no_block)
}

/// Restore the OS default disposition for `code`.
pub(crate) fn restore_default(code: SigCode, no_block: &SignalSet) -> SignalResult<()> {
    set_action(code, libc::SIG_DFL, no_block)
}

fn set_action(code: SigCode, action: libc::sighandler_t, no_block: &SignalSet) -> SignalResult<()> {
    // sa_flags stays 0: the handler survives firing and the no-block set is
    // the only mask applied during its execution.
    let mut sa: libc::sigaction = unsafe { MaybeUninit::zeroed().assume_init() };
    sa.sa_sigaction = action;
    sa.sa_mask = to_os_set(no_block);
    sa.sa_flags = 0;

    let rv = unsafe { libc::sigaction(code as libc::c_int, &sa, ptr::null_mut()) };
    Errno::result(rv).map(drop).map_err(Into::into)
}

/// Block the given signals at the process mask level. Safe to call from the
/// dispatch context.
pub(crate) fn block(set: &SignalSet) -> SignalResult<()> {
    change_mask(libc::SIG_BLOCK, set)
}

/// Unblock the given signals at the process mask level.
pub(crate) fn unblock(set: &SignalSet) -> SignalResult<()> {
    change_mask(libc::SIG_UNBLOCK, set)
}

fn change_mask(how: libc::c_int, set: &SignalSet) -> SignalResult<()> {
    let raw = to_os_set(set);
    let rv = unsafe { libc::sigprocmask(how, &raw, ptr::null_mut()) };
    Errno::result(rv).map(drop).map_err(Into::into)
}

/// Suspend the calling thread until one of `set` is delivered or `timeout`
/// elapses; the consumed code is the `Ok` value.
pub(crate) fn timed_wait(set: &SignalSet, timeout: &libc::timespec) -> Result<SigCode, Errno> {
    let raw = to_os_set(set);
    let mut info = MaybeUninit::<libc::siginfo_t>::zeroed();

    let rv = unsafe { libc::sigtimedwait(&raw, info.as_mut_ptr(), timeout) };
    Errno::result(rv).map(|code| code as SigCode)
}
