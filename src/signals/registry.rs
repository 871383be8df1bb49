/*!
 * Signal Registry
 * Process-wide signal state machine: install/remove, group masking,
 * synchronous wait, and the dispatch routine shared by both delivery paths
 */

use super::os;
use super::set::{AtomicSignalSet, SignalSet};
use super::types::{HandlerFn, SigCode, SignalError, SignalResult, NSIG};
use arc_swap::ArcSwapOption;
use log::{debug, info, warn};
use nix::errno::Errno;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Bound substituted for an "indefinite" wait: long, but finite, so a
/// pathological wait still terminates. Fits `time_t` on 32-bit hosts.
const WAIT_FOREVER_SECS: libc::time_t = 0x7FFF_FFFF;

/// Wrapper keeping the user callback behind a lock-free swappable slot.
struct HandlerSlot {
    callback: HandlerFn,
}

/// Process-wide signal registry.
///
/// One instance exists per process, reached through [`SignalRegistry::global`].
/// The slow-path mutators (`init`, `exit`, `install`, `remove`) are
/// single-writer by contract: callers serialize them externally. The crate
/// adds no locking of its own, since the dispatch path can interrupt any of
/// them and must never contend for a lock the interrupted code is holding.
///
/// Lifecycle: the first successful [`init`](Self::init) captures the
/// callback and clears the installed set; [`exit`](Self::exit) only drops
/// the ownership count and deliberately leaves the installed set and the
/// callback in place. A later `init`, once the count is back at zero,
/// re-arms everything.
pub struct SignalRegistry {
    init_count: AtomicU32,
    installed: AtomicSignalSet,
    no_block: AtomicSignalSet,
    handler: ArcSwapOption<HandlerSlot>,
}

static REGISTRY: SignalRegistry = SignalRegistry {
    init_count: AtomicU32::new(0),
    installed: AtomicSignalSet::new(),
    no_block: AtomicSignalSet::new(),
    handler: ArcSwapOption::const_empty(),
};

impl SignalRegistry {
    /// Singleton accessor for the process-wide registry.
    pub fn global() -> &'static SignalRegistry {
        &REGISTRY
    }

    /// Take ownership of process signal handling.
    ///
    /// Only one owner is permitted at a time: if the registry is already
    /// initialized this fails with [`SignalError::AlreadyBusy`] and leaves
    /// the current owner's callback and installed set untouched. On the 0→1
    /// transition the callback is captured and the installed and no-block
    /// sets are cleared.
    pub fn init(&self, handler: Option<HandlerFn>) -> SignalResult<()> {
        if self
            .init_count
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SignalError::AlreadyBusy);
        }

        let has_callback = handler.is_some();
        self.handler
            .store(handler.map(|callback| Arc::new(HandlerSlot { callback })));
        self.installed.clear();
        self.no_block.clear();

        info!("signal registry initialized (callback: {})", has_callback);
        Ok(())
    }

    /// Release one level of ownership.
    ///
    /// Only the count drops; installed signals keep their dispositions and
    /// the callback stays registered until the next 0→1 `init`.
    pub fn exit(&self) -> SignalResult<()> {
        self.init_count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map_err(|_| SignalError::NotInitialized)?;

        info!("signal registry released");
        Ok(())
    }

    /// Take over the OS disposition for `code` and add it to the installed
    /// set. Re-installing an already-installed code is not an error.
    pub fn install(&self, code: SigCode) -> SignalResult<()> {
        self.ensure_ready()?;
        if code >= NSIG {
            return Err(SignalError::IllegalSignal(code));
        }

        os::install_handler(code, &self.no_block.snapshot())?;
        self.installed.add(code);

        debug!("installed signal {}", code);
        Ok(())
    }

    /// Restore the OS default disposition for `code` and drop it from the
    /// installed set. Removing a code that was never installed is a no-op.
    pub fn remove(&self, code: SigCode) -> SignalResult<()> {
        self.ensure_ready()?;

        os::restore_default(code, &self.no_block.snapshot())?;
        self.installed.remove(code);

        debug!("removed signal {}", code);
        Ok(())
    }

    /// Block every currently installed signal at the process mask level.
    ///
    /// The set is a snapshot at call time; codes installed afterwards are
    /// not retroactively masked. Deliveries of masked signals stay pending
    /// (subject to the OS queueing limits) until [`unmask_all`](Self::unmask_all).
    pub fn mask_all(&self) -> SignalResult<()> {
        self.ensure_ready()?;

        let snapshot = self.installed.snapshot();
        os::block(&snapshot)?;

        debug!("masked installed signals {}", snapshot);
        Ok(())
    }

    /// Unblock every currently installed signal at the process mask level.
    pub fn unmask_all(&self) -> SignalResult<()> {
        self.ensure_ready()?;

        let snapshot = self.installed.snapshot();
        os::unblock(&snapshot)?;

        debug!("unmasked installed signals {}", snapshot);
        Ok(())
    }

    /// Suspend the calling thread until one installed signal is delivered or
    /// the timeout elapses, and return the delivered code.
    ///
    /// `timeout_ms == 0` waits with a large finite bound instead of forever.
    /// On delivery the dispatch routine runs synchronously before this
    /// returns, so wait-based and callback-based consumption share one
    /// delivery path.
    ///
    /// An installed signal that is not masked can be consumed by the
    /// asynchronous handler path while this call sleeps, surfacing here as
    /// an `EINTR` failure rather than a delivery; call
    /// [`mask_all`](Self::mask_all) first when consuming through `wait`.
    ///
    /// Edge case: if the large bound of a zero timeout ever elapses, the raw
    /// OS error is returned rather than [`SignalError::Timeout`].
    pub fn wait(&self, timeout_ms: u32) -> SignalResult<SigCode> {
        self.ensure_ready()?;

        let waited = self.installed.snapshot();
        debug!("waiting for one of {} (timeout {} ms)", waited, timeout_ms);

        match os::timed_wait(&waited, &wait_timespec(timeout_ms)) {
            Ok(code) => {
                self.dispatch(code);
                Ok(code)
            }
            Err(Errno::EAGAIN) if timeout_ms != 0 => Err(SignalError::Timeout),
            Err(err) => {
                warn!("signal wait failed: {}", err);
                Err(SignalError::Os(err))
            }
        }
    }

    /// Snapshot of the installed set.
    pub fn installed(&self) -> SignalSet {
        self.installed.snapshot()
    }

    /// Delivery routine invoked for every consumed signal, from the OS
    /// trampoline or from a successful [`wait`](Self::wait).
    ///
    /// Runs in the signal-delivery context: no locks, no allocation, no
    /// logging. With no callback registered, the installed set is blocked as
    /// a fail-safe so an unattended registry accumulates pending signals
    /// instead of re-entering here.
    pub(crate) fn dispatch(&self, code: SigCode) {
        let slot = self.handler.load();
        match slot.as_ref() {
            Some(slot) => (slot.callback)(code),
            None => {
                let _ = os::block(&self.installed.snapshot());
            }
        }
    }

    fn ensure_ready(&self) -> SignalResult<()> {
        if self.init_count.load(Ordering::SeqCst) == 0 {
            return Err(SignalError::NotInitialized);
        }
        Ok(())
    }
}

fn wait_timespec(timeout_ms: u32) -> libc::timespec {
    if timeout_ms != 0 {
        libc::timespec {
            tv_sec: (timeout_ms / 1000) as libc::time_t,
            tv_nsec: ((timeout_ms % 1000) as libc::c_long) * 1_000_000,
        }
    } else {
        libc::timespec {
            tv_sec: WAIT_FOREVER_SECS,
            tv_nsec: 0,
        }
    }
}
