//! Producer side of the chat queue.

use crate::{DispatchSettings, DispatchStats, StopSignal};
use parley_core::{ChatJob, NpcId, PlayerId};
use parley_npc::NpcStore;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// What happened to a chat message handed to [`ChatDispatcher::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum EnqueueStatus {
    /// Accepted; the worker will answer
    Queued,
    /// The NPC is not tracked; message dropped
    UnknownNpc,
    /// Queue at capacity; message dropped
    QueueFull,
    /// The worker is shutting down; message dropped
    Stopped,
}

/// Build a bounded queue and the dispatcher that feeds it.
pub fn chat_queue(
    settings: &DispatchSettings,
    store: Arc<NpcStore>,
    stats: DispatchStats,
    stop: StopSignal,
) -> (ChatDispatcher, mpsc::Receiver<ChatJob>) {
    let (tx, rx) = mpsc::channel((*settings.queue_capacity()).max(1));
    let dispatcher = ChatDispatcher {
        tx,
        store,
        stats,
        stop,
    };
    (dispatcher, rx)
}

/// Cheap, cloneable producer handle. Safe to call from any thread.
#[derive(Debug, Clone)]
pub struct ChatDispatcher {
    tx: mpsc::Sender<ChatJob>,
    store: Arc<NpcStore>,
    stats: DispatchStats,
    stop: StopSignal,
}

impl ChatDispatcher {
    /// Queue a player's message for `npc_id`. Never blocks.
    pub fn enqueue(
        &self,
        npc_id: NpcId,
        player_id: PlayerId,
        message: impl Into<String>,
    ) -> EnqueueStatus {
        if self.stop.is_raised() {
            debug!(npc = %npc_id, "Dispatcher stopped; dropping message");
            return EnqueueStatus::Stopped;
        }

        if !self.store.contains(npc_id) {
            warn!(npc = %npc_id, player = %player_id, "Chat for unknown NPC dropped");
            self.stats.record_rejected_unknown();
            return EnqueueStatus::UnknownNpc;
        }

        match self.tx.try_send(ChatJob::new(npc_id, player_id, message)) {
            Ok(()) => {
                self.stats.record_enqueued();
                debug!(npc = %npc_id, "Chat queued");
                EnqueueStatus::Queued
            }
            Err(TrySendError::Full(job)) => {
                warn!(npc = %job.npc_id(), "Chat queue full; message dropped");
                self.stats.record_rejected_full();
                EnqueueStatus::QueueFull
            }
            Err(TrySendError::Closed(_)) => {
                debug!(npc = %npc_id, "Chat queue closed; message dropped");
                EnqueueStatus::Stopped
            }
        }
    }

    /// Free queue slots right now.
    pub fn remaining_capacity(&self) -> usize {
        self.tx.capacity()
    }

    /// Shared counters.
    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }
}
