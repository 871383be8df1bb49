/*!
 * Signal Sets
 * Fixed-size bitset of signal codes, plus the atomic variant backing the
 * process-wide installed set
 */

use super::types::{SigCode, NSIG};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Set of signal codes, one bit per code in `0..NSIG`.
///
/// Decoupled from any OS `sigset_t` representation; the OS glue converts a
/// set at the syscall boundary. Mutators ignore out-of-range codes; the
/// range check that callers see lives in the registry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SignalSet(u64);

impl SignalSet {
    /// Empty set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Add a signal code to the set
    pub fn add(&mut self, code: SigCode) {
        if code < NSIG {
            self.0 |= 1 << code;
        }
    }

    /// Remove a signal code from the set
    pub fn remove(&mut self, code: SigCode) {
        if code < NSIG {
            self.0 &= !(1 << code);
        }
    }

    /// Membership test
    pub fn contains(&self, code: SigCode) -> bool {
        code < NSIG && self.0 & (1 << code) != 0
    }

    /// Bitwise union with another set
    pub fn union(&self, other: &SignalSet) -> SignalSet {
        SignalSet(self.0 | other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of codes in the set
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the member codes in ascending order
    pub fn iter(&self) -> impl Iterator<Item = SigCode> + '_ {
        (0..NSIG).filter(move |code| self.contains(*code))
    }

    pub(crate) const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub(crate) const fn bits(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SignalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, code) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", code)?;
        }
        write!(f, "}}")
    }
}

/// Atomically mutable signal set.
///
/// Plain atomic loads make snapshots safe to take from the signal-delivery
/// context; mutation is single-writer by the registry's documented contract.
pub(crate) struct AtomicSignalSet(AtomicU64);

impl AtomicSignalSet {
    pub(crate) const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub(crate) fn add(&self, code: SigCode) {
        if code < NSIG {
            self.0.fetch_or(1 << code, Ordering::SeqCst);
        }
    }

    pub(crate) fn remove(&self, code: SigCode) {
        if code < NSIG {
            self.0.fetch_and(!(1 << code), Ordering::SeqCst);
        }
    }

    pub(crate) fn clear(&self) {
        self.0.store(0, Ordering::SeqCst);
    }

    /// Value snapshot at the moment of the call
    pub(crate) fn snapshot(&self) -> SignalSet {
        SignalSet::from_bits(self.0.load(Ordering::SeqCst))
    }
}
