use portable_atomic::{AtomicU64, Ordering};

/// Point-in-time counters for an [`OrderedThreadPool`].
///
/// Counters are read one at a time without a common lock, so a snapshot taken
/// while jobs are running may be slightly skewed between fields. After
/// [`OrderedThreadPool::shutdown`] returns the values are final.
///
/// [`OrderedThreadPool`]: crate::OrderedThreadPool
/// [`OrderedThreadPool::shutdown`]: crate::OrderedThreadPool::shutdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolStats {
    /// Jobs accepted by `submit`.
    pub submitted: u64,
    /// Jobs whose turn at the ticket gate has passed, whether or not they
    /// panicked.
    pub completed: u64,
    /// Jobs whose compute step panicked.
    pub compute_panics: u64,
    /// Jobs whose finalize step panicked.
    pub finalize_panics: u64,
    /// Jobs waiting in the submission queue.
    pub queued: u64,
}

impl PoolStats {
    /// Accepted jobs that have not completed yet, queued or running.
    pub const fn in_flight(&self) -> u64 {
        self.submitted.saturating_sub(self.completed)
    }
}

/// Counters updated by workers. The submitted count is not kept here; it is
/// the queue's sequence counter.
#[derive(Default)]
pub(crate) struct Counters {
    completed: AtomicU64,
    compute_panics: AtomicU64,
    finalize_panics: AtomicU64,
}

impl Counters {
    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn record_compute_panic(&self) {
        self.compute_panics.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_finalize_panic(&self) {
        self.finalize_panics.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, submitted: u64, queued: usize) -> PoolStats {
        PoolStats {
            completed: self.completed.load(Ordering::Acquire),
            submitted,
            compute_panics: self.compute_panics.load(Ordering::Relaxed),
            finalize_panics: self.finalize_panics.load(Ordering::Relaxed),
            queued: queued as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_flight_saturates() {
        let stats = PoolStats {
            submitted: 3,
            completed: 5,
            ..PoolStats::default()
        };
        assert_eq!(stats.in_flight(), 0);

        let counters = Counters::default();
        counters.record_completed();
        counters.record_compute_panic();
        let snapshot = counters.snapshot(2, 1);
        assert_eq!(snapshot.in_flight(), 1);
        assert_eq!(snapshot.compute_panics, 1);
        assert_eq!(snapshot.finalize_panics, 0);
        assert_eq!(snapshot.queued, 1);
    }
}
