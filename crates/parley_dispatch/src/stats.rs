//! Counters for the chat pipeline.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Shared, cheaply cloned counters updated by the producer and the worker.
#[derive(Debug, Clone, Default)]
pub struct DispatchStats {
    inner: Arc<StatsInner>,
}

#[derive(Debug, Default)]
struct StatsInner {
    enqueued: AtomicU64,
    rejected_full: AtomicU64,
    rejected_unknown: AtomicU64,
    replied: AtomicU64,
    failed: AtomicU64,
    no_provider: AtomicU64,
    dropped_stale: AtomicU64,
    dropped_missing: AtomicU64,
    last_reply: Mutex<Option<Instant>>,
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Jobs accepted into the queue
    pub enqueued: u64,
    /// Jobs refused because the queue was full
    pub rejected_full: u64,
    /// Jobs refused because the NPC was not tracked
    pub rejected_unknown: u64,
    /// Provider replies spoken
    pub replied: u64,
    /// Provider calls that failed or timed out
    pub failed: u64,
    /// Jobs answered with the no-provider line
    pub no_provider: u64,
    /// Jobs dropped for being too old
    pub dropped_stale: u64,
    /// Jobs dropped because the NPC disappeared
    pub dropped_missing: u64,
}

macro_rules! counter {
    ($record:ident, $field:ident) => {
        #[doc = concat!("Increment `", stringify!($field), "`.")]
        pub fn $record(&self) {
            self.inner.$field.fetch_add(1, Ordering::Relaxed);
        }
    };
}

impl DispatchStats {
    /// Fresh zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    counter!(record_enqueued, enqueued);
    counter!(record_rejected_full, rejected_full);
    counter!(record_rejected_unknown, rejected_unknown);
    counter!(record_failed, failed);
    counter!(record_no_provider, no_provider);
    counter!(record_dropped_stale, dropped_stale);
    counter!(record_dropped_missing, dropped_missing);

    /// Count a spoken provider reply and stamp the time.
    pub fn record_replied(&self) {
        self.inner.replied.fetch_add(1, Ordering::Relaxed);
        *self.inner.last_reply.lock() = Some(Instant::now());
    }

    /// When the last provider reply was spoken.
    pub fn last_reply(&self) -> Option<Instant> {
        *self.inner.last_reply.lock()
    }

    /// Copy every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        StatsSnapshot {
            enqueued: load(&self.inner.enqueued),
            rejected_full: load(&self.inner.rejected_full),
            rejected_unknown: load(&self.inner.rejected_unknown),
            replied: load(&self.inner.replied),
            failed: load(&self.inner.failed),
            no_provider: load(&self.inner.no_provider),
            dropped_stale: load(&self.inner.dropped_stale),
            dropped_missing: load(&self.inner.dropped_missing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_counters() {
        let stats = DispatchStats::new();
        let other = stats.clone();
        other.record_enqueued();
        other.record_replied();
        stats.record_failed();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.enqueued, 1);
        assert_eq!(snapshot.replied, 1);
        assert_eq!(snapshot.failed, 1);
        assert!(stats.last_reply().is_some());
    }
}
