//! Queued chat work.

use crate::{NpcId, PlayerId};
use derive_getters::Getters;
use std::time::{Duration, Instant};

/// One pending chat request. Immutable once created.
#[derive(Debug, Clone, Getters)]
pub struct ChatJob {
    /// NPC being addressed
    npc_id: NpcId,
    /// Player who spoke
    player_id: PlayerId,
    /// Raw message text
    message: String,
    /// When the job entered the queue
    enqueued_at: Instant,
}

impl ChatJob {
    /// Create a job stamped with the current time.
    pub fn new(npc_id: NpcId, player_id: PlayerId, message: impl Into<String>) -> Self {
        Self {
            npc_id,
            player_id,
            message: message.into(),
            enqueued_at: Instant::now(),
        }
    }

    /// Time spent since enqueue.
    pub fn age(&self) -> Duration {
        self.enqueued_at.elapsed()
    }
}
