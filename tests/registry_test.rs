/*!
 * Signal Registry Tests
 * End-to-end tests for the process-wide signal registry
 *
 * Everything here mutates process-global state (the registry, OS signal
 * dispositions, the process signal mask), so every test is serialized and
 * restores what it touched.
 */

use nix::sys::signal::{raise, Signal};
use serial_test::serial;
use sigport::signals::{SignalError, SignalRegistry, NSIG};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

fn usr1() -> u32 {
    Signal::SIGUSR1 as u32
}

fn usr2() -> u32 {
    Signal::SIGUSR2 as u32
}

/// Callback that counts invocations and records the last delivered code.
fn counting_handler(count: Arc<AtomicU32>, last: Arc<AtomicU32>) -> sigport::HandlerFn {
    Box::new(move |code| {
        count.fetch_add(1, Ordering::SeqCst);
        last.store(code, Ordering::SeqCst);
    })
}

#[test]
#[serial]
fn operations_require_init() {
    let registry = SignalRegistry::global();

    assert_eq!(registry.exit(), Err(SignalError::NotInitialized));
    assert_eq!(registry.install(usr1()), Err(SignalError::NotInitialized));
    assert_eq!(registry.remove(usr1()), Err(SignalError::NotInitialized));
    assert_eq!(registry.mask_all(), Err(SignalError::NotInitialized));
    assert_eq!(registry.unmask_all(), Err(SignalError::NotInitialized));
    assert_eq!(registry.wait(10), Err(SignalError::NotInitialized));
}

#[test]
#[serial]
fn install_rejects_out_of_range_codes() {
    let registry = SignalRegistry::global();
    registry.init(None).unwrap();

    assert_eq!(registry.install(NSIG), Err(SignalError::IllegalSignal(NSIG)));
    assert_eq!(
        registry.install(10_000),
        Err(SignalError::IllegalSignal(10_000))
    );
    assert!(registry.installed().is_empty());

    registry.exit().unwrap();
}

#[test]
#[serial]
fn install_remove_roundtrip() {
    let registry = SignalRegistry::global();
    registry.init(None).unwrap();

    registry.install(usr1()).unwrap();
    assert!(registry.installed().contains(usr1()));

    registry.remove(usr1()).unwrap();
    assert!(!registry.installed().contains(usr1()));

    // Removing again is a no-op, not an error
    registry.remove(usr1()).unwrap();
    assert!(!registry.installed().contains(usr1()));

    registry.exit().unwrap();
}

#[test]
#[serial]
fn install_is_idempotent() {
    let registry = SignalRegistry::global();
    registry.init(None).unwrap();

    registry.install(usr1()).unwrap();
    let first = registry.installed();
    registry.install(usr1()).unwrap();
    assert_eq!(registry.installed(), first);
    assert_eq!(registry.installed().len(), 1);

    registry.remove(usr1()).unwrap();
    registry.exit().unwrap();
}

#[test]
#[serial]
fn second_init_is_rejected_and_first_owner_intact() {
    let registry = SignalRegistry::global();
    let count = Arc::new(AtomicU32::new(0));
    let last = Arc::new(AtomicU32::new(0));

    registry
        .init(Some(counting_handler(count.clone(), last.clone())))
        .unwrap();
    registry.install(usr1()).unwrap();

    assert_eq!(registry.init(None), Err(SignalError::AlreadyBusy));

    // The first owner's installed set and callback survived the rejection
    assert!(registry.installed().contains(usr1()));
    raise(Signal::SIGUSR1).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(last.load(Ordering::SeqCst), usr1());

    registry.remove(usr1()).unwrap();
    registry.exit().unwrap();
}

#[test]
#[serial]
fn wait_times_out_without_delivery() {
    let registry = SignalRegistry::global();
    registry.init(None).unwrap();
    registry.install(usr2()).unwrap();

    let started = Instant::now();
    assert_eq!(registry.wait(50), Err(SignalError::Timeout));
    let elapsed = started.elapsed().as_millis();
    assert!(elapsed >= 50, "timed out after only {} ms", elapsed);
    assert!(elapsed < 2_000, "timeout overshot to {} ms", elapsed);

    registry.remove(usr2()).unwrap();
    registry.exit().unwrap();
}

#[test]
#[serial]
fn wait_consumes_pending_installed_signal() {
    let registry = SignalRegistry::global();
    registry.init(None).unwrap();
    registry.install(usr1()).unwrap();

    // Keep the delivery pending so the wait path consumes it
    registry.mask_all().unwrap();
    raise(Signal::SIGUSR1).unwrap();

    assert_eq!(registry.wait(1_000), Ok(usr1()));

    registry.unmask_all().unwrap();
    registry.remove(usr1()).unwrap();
    registry.exit().unwrap();
}

#[test]
#[serial]
fn wait_delivery_invokes_callback_exactly_once() {
    let registry = SignalRegistry::global();
    let count = Arc::new(AtomicU32::new(0));
    let last = Arc::new(AtomicU32::new(0));

    registry
        .init(Some(counting_handler(count.clone(), last.clone())))
        .unwrap();
    registry.install(usr1()).unwrap();
    registry.mask_all().unwrap();

    raise(Signal::SIGUSR1).unwrap();
    assert_eq!(registry.wait(1_000), Ok(usr1()));

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(last.load(Ordering::SeqCst), usr1());

    registry.unmask_all().unwrap();
    registry.remove(usr1()).unwrap();
    registry.exit().unwrap();
}

#[test]
#[serial]
fn masked_delivery_is_deferred_not_lost() {
    let registry = SignalRegistry::global();
    let count = Arc::new(AtomicU32::new(0));
    let last = Arc::new(AtomicU32::new(0));

    registry
        .init(Some(counting_handler(count.clone(), last.clone())))
        .unwrap();
    registry.install(usr2()).unwrap();
    registry.mask_all().unwrap();

    // Deferred while masked...
    raise(Signal::SIGUSR2).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);

    // ...and dispatched once the mask lifts
    registry.unmask_all().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(last.load(Ordering::SeqCst), usr2());

    registry.remove(usr2()).unwrap();
    registry.exit().unwrap();
}

#[test]
#[serial]
fn exit_preserves_state_and_reinit_clears_it() {
    let registry = SignalRegistry::global();
    registry.init(None).unwrap();
    registry.install(usr1()).unwrap();

    // exit only drops ownership; the installed set survives
    registry.exit().unwrap();
    assert!(registry.installed().contains(usr1()));

    // a fresh owner starts from an empty set
    registry.init(None).unwrap();
    assert!(registry.installed().is_empty());

    // the OS disposition still points at the registry; restore the default
    registry.remove(usr1()).unwrap();
    registry.exit().unwrap();
}
