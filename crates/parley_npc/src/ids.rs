//! Process-wide NPC id allocation.

use parley_core::NpcId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out NPC ids starting at 1.
///
/// Clones share one counter, so stores built from the same source never
/// reuse an id, even after the previous store is gone.
#[derive(Debug, Clone)]
pub struct NpcIdSource(Arc<AtomicU64>);

impl Default for NpcIdSource {
    fn default() -> Self {
        Self::new()
    }
}

impl NpcIdSource {
    /// Fresh counter.
    pub fn new() -> Self {
        Self(Arc::new(AtomicU64::new(1)))
    }

    /// Take the next id.
    pub fn next_id(&self) -> NpcId {
        NpcId(self.0.fetch_add(1, Ordering::Relaxed))
    }

    /// The id the next call to [`next_id`](Self::next_id) would return.
    pub fn peek(&self) -> NpcId {
        NpcId(self.0.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_counter() {
        let ids = NpcIdSource::new();
        let other = ids.clone();
        assert_eq!(ids.next_id(), NpcId(1));
        assert_eq!(other.next_id(), NpcId(2));
        assert_eq!(ids.peek(), NpcId(3));
    }
}
