//! Sequence numbers for synthesized notifications.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

static SHARED: OnceLock<Arc<SequenceGenerator>> = OnceLock::new();

/// Monotonically increasing counter shared by every proxy that stamps
/// notifications from it.
///
/// Values returned by [`next`](Self::next) are unique and strictly
/// increasing across all threads. The theoretical limit is `u64::MAX`;
/// wraparound is not handled.
#[derive(Debug, Default)]
pub struct SequenceGenerator {
    last: AtomicU64,
}

impl SequenceGenerator {
    /// Creates a counter whose first value is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a counter whose first value is `last + 1`.
    #[must_use]
    pub const fn starting_at(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }

    /// The process-wide generator, created on first use.
    pub fn shared() -> Arc<Self> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self::new())))
    }

    /// Returns the next sequence number.
    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The most recently issued value, or the starting point if none was issued.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}
