//! Consumer side of the chat queue.

use crate::{DispatchSettings, DispatchState, DispatchStats, StatusBoard, StopSignal};
use parley_core::{ChatJob, ChatTurn, NpcId};
use parley_interface::{ChatProvider, EngineBoundary};
use parley_models::sanitize_reply;
use parley_npc::NpcStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Spoken when no backend was available at startup.
pub const NO_PROVIDER_REPLY: &str = "*scratches head* Sorry, my thoughts are elsewhere right now.";

/// Spoken when a backend call fails or runs out of time.
pub const CALL_FAILED_REPLY: &str = "Hmm, I lost my train of thought. Could you say that again?";

/// Drains the chat queue one job at a time.
///
/// The worker is the only writer of NPC history.
pub struct ChatWorker {
    rx: mpsc::Receiver<ChatJob>,
    store: Arc<NpcStore>,
    engine: Arc<dyn EngineBoundary>,
    provider: Option<Arc<dyn ChatProvider>>,
    settings: DispatchSettings,
    stats: DispatchStats,
    status: StatusBoard,
    stop: StopSignal,
}

impl ChatWorker {
    /// Assemble a worker. `provider` is `None` when nothing was available.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rx: mpsc::Receiver<ChatJob>,
        store: Arc<NpcStore>,
        engine: Arc<dyn EngineBoundary>,
        provider: Option<Arc<dyn ChatProvider>>,
        settings: DispatchSettings,
        stats: DispatchStats,
        status: StatusBoard,
        stop: StopSignal,
    ) -> Self {
        Self {
            rx,
            store,
            engine,
            provider,
            settings,
            stats,
            status,
            stop,
        }
    }

    /// Replace the provider chosen at construction.
    pub fn with_provider(mut self, provider: Option<Arc<dyn ChatProvider>>) -> Self {
        self.provider = provider;
        self
    }

    /// Run until the stop signal is raised or every sender is gone.
    ///
    /// Jobs still queued at stop are discarded.
    #[instrument(skip(self), fields(provider = ?self.provider.as_ref().map(|p| p.kind())))]
    pub async fn run(mut self) {
        info!("Chat worker started");
        self.status.set(DispatchState::Idle, "waiting for chat");

        loop {
            if self.stop.is_raised() {
                break;
            }
            match tokio::time::timeout(*self.settings.poll_interval(), self.rx.recv()).await {
                Ok(Some(job)) => {
                    self.process(job).await;
                    self.status.set(DispatchState::Idle, "waiting for chat");
                }
                Ok(None) => {
                    debug!("All producers gone");
                    break;
                }
                Err(_) => continue,
            }
        }

        self.rx.close();
        let mut discarded = 0usize;
        while self.rx.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            info!(discarded, "Discarded queued chat at shutdown");
        }

        self.status.set(DispatchState::Offline, "stopped");
        info!("Chat worker stopped");
    }

    /// Answer one job.
    #[instrument(skip(self, job), fields(npc = %job.npc_id(), player = %job.player_id()))]
    pub async fn process(&self, job: ChatJob) {
        let npc_id = *job.npc_id();

        let Some((context, history)) = self.store.conversation(npc_id) else {
            debug!("NPC gone before its turn; dropping job");
            self.stats.record_dropped_missing();
            return;
        };

        if let Some(max_age) = self.settings.max_job_age() {
            let age = job.age();
            if age > *max_age {
                warn!(age_ms = age.as_millis() as u64, "Dropping stale chat job");
                self.stats.record_dropped_stale();
                return;
            }
        }

        let Some(provider) = &self.provider else {
            self.stats.record_no_provider();
            self.speak(npc_id, NO_PROVIDER_REPLY);
            return;
        };

        self.status
            .set(DispatchState::Working, format!("answering npc {}", npc_id));
        let budget = *self.settings.response_timeout();

        let outcome = tokio::time::timeout(
            budget,
            provider.generate_response(&context, &history, job.message(), budget),
        )
        .await;

        let raw = match outcome {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(error = %e, "Provider call failed");
                self.stats.record_failed();
                self.speak(npc_id, CALL_FAILED_REPLY);
                return;
            }
            Err(_) => {
                warn!(budget_ms = budget.as_millis() as u64, "Provider call timed out");
                self.stats.record_failed();
                self.speak(npc_id, CALL_FAILED_REPLY);
                return;
            }
        };

        let reply = if *self.settings.filter_reasoning() {
            sanitize_reply(&raw)
        } else {
            raw.trim().to_string()
        };

        let turn = ChatTurn::new(job.message().as_str(), reply.as_str());
        if self
            .store
            .append_turn(npc_id, turn, *self.settings.history_limit())
        {
            self.engine.emit_speech(npc_id, &reply);
            self.stats.record_replied();
            debug!(chars = reply.len(), "Reply spoken");
        } else {
            debug!("NPC removed during provider call; reply discarded");
            self.stats.record_dropped_missing();
        }
    }

    /// Speak a canned line if the NPC still exists.
    fn speak(&self, npc_id: NpcId, line: &str) {
        if self.store.contains(npc_id) {
            self.engine.emit_speech(npc_id, line);
        } else {
            self.stats.record_dropped_missing();
        }
    }
}
