//! Lifecycle of the NPC chat extension.

use crate::events::{EventBus, HandlerId, SessionEvent, SessionEventKind};
use parking_lot::Mutex;
use parley_config::{EffectiveConfig, resolve};
use parley_core::{ChatTurn, NpcId, NpcRecord, PlayerId, Position, ProviderKind};
use parley_dispatch::{
    ChatDispatcher, ChatWorker, DispatchSettings, DispatchStats, DispatchStatus, EnqueueStatus,
    StatsSnapshot, StatusBoard, StopSignal, WorkerHandle, chat_queue,
};
use parley_error::{ParleyResult, WorkerError, WorkerErrorKind};
use parley_interface::{ChatProvider, EngineBoundary};
use parley_models::{ProviderRegistry, select_provider};
use parley_npc::{NpcIdSource, NpcStore};
use std::path::PathBuf;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Mod id used to look up the engine's configuration.
pub const DEFAULT_MOD_ID: &str = "ai_npc";

/// Name of the background worker thread.
pub const WORKER_THREAD_NAME: &str = "npc-chat-worker";

const HANDSHAKE_GRACE: Duration = Duration::from_secs(1);

/// How to build a [`NpcChatService`].
#[derive(Clone)]
pub struct ServiceOptions {
    /// Key passed to [`EngineBoundary::mod_config`]
    pub mod_id: String,
    /// Local override file layered over the engine's config
    pub override_path: Option<PathBuf>,
    /// Bus to subscribe join, leave and chat handlers on while running
    pub event_bus: Option<Arc<EventBus>>,
    /// Drivers replacing the configured ones, keyed by their `kind()`
    pub providers: Vec<Arc<dyn ChatProvider>>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            mod_id: DEFAULT_MOD_ID.to_string(),
            override_path: None,
            event_bus: None,
            providers: Vec::new(),
        }
    }
}

impl std::fmt::Debug for ServiceOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceOptions")
            .field("mod_id", &self.mod_id)
            .field("override_path", &self.override_path)
            .field("event_bus", &self.event_bus.is_some())
            .field(
                "providers",
                &self.providers.iter().map(|p| p.kind()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ServiceOptions {
    /// Use `path` as the local override file.
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    /// Subscribe to `bus` while running.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Replace the configured driver for `provider.kind()`.
    pub fn with_provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.providers.push(provider);
        self
    }
}

/// Result of [`NpcChatService::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Worker running; `provider` is `None` when nothing was available
    Started {
        /// Backend chosen for this run
        provider: Option<ProviderKind>,
    },
    /// Already running; nothing changed
    AlreadyRunning,
    /// Configuration has `enabled = false`
    Disabled,
    /// Not the authoritative server; nothing started
    ClientContext,
}

/// Result of [`NpcChatService::stop`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopReport {
    /// Whether the service was running
    pub was_running: bool,
    /// Whether the worker exited within the join window
    pub worker_joined: bool,
    /// NPCs despawned
    pub despawned: usize,
}

/// State shared by every entry point while running.
struct Session {
    config: Arc<EffectiveConfig>,
    store: Arc<NpcStore>,
    dispatcher: ChatDispatcher,
    stats: DispatchStats,
    status: StatusBoard,
    provider: Option<ProviderKind>,
}

/// Owned by whoever is starting or stopping.
#[derive(Default)]
struct Lifecycle {
    worker: Option<WorkerHandle>,
    handlers: Vec<HandlerId>,
}

struct Inner {
    engine: Arc<dyn EngineBoundary>,
    options: ServiceOptions,
    lifecycle: Mutex<Lifecycle>,
    session: Mutex<Option<Arc<Session>>>,
    ids: NpcIdSource,
}

/// The extension's explicit runtime context.
///
/// Cheap to clone; clones share state. `start` and `stop` bracket a run and
/// may be repeated; NPC ids keep increasing across runs. Session entry points never block on the network and do
/// nothing (beyond a log line) when the service is not running.
#[derive(Clone)]
pub struct NpcChatService {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for NpcChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NpcChatService")
            .field("options", &self.inner.options)
            .field("running", &self.is_running())
            .finish()
    }
}

impl NpcChatService {
    /// Create a stopped service.
    pub fn new(engine: Arc<dyn EngineBoundary>, options: ServiceOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                engine,
                options,
                lifecycle: Mutex::new(Lifecycle::default()),
                session: Mutex::new(None),
                ids: NpcIdSource::new(),
            }),
        }
    }

    /// Resolve configuration, probe providers and start the worker.
    ///
    /// # Errors
    ///
    /// Fails if the bundled defaults are broken, the worker thread cannot be
    /// spawned, or the worker never reports its provider choice.
    #[instrument(skip(self), fields(mod_id = %self.inner.options.mod_id))]
    pub fn start(&self) -> ParleyResult<StartOutcome> {
        let mut lifecycle = self.inner.lifecycle.lock();

        if self.inner.session.lock().is_some() {
            debug!("Start requested while running");
            return Ok(StartOutcome::AlreadyRunning);
        }

        let engine = self.inner.engine.clone();
        if !engine.is_server_context() {
            info!("Not the server; NPC chat stays off");
            return Ok(StartOutcome::ClientContext);
        }

        let engine_config = engine.mod_config(&self.inner.options.mod_id);
        let config = Arc::new(resolve(
            engine_config.as_ref(),
            self.inner.options.override_path.as_deref(),
        )?);
        if !config.enabled() {
            info!("NPC chat disabled by configuration");
            return Ok(StartOutcome::Disabled);
        }

        let store = Arc::new(NpcStore::with_id_source(
            config.clone(),
            engine.clone(),
            self.inner.ids.clone(),
        ));
        let registry = self
            .inner
            .options
            .providers
            .iter()
            .cloned()
            .fold(ProviderRegistry::from_config(&config), |registry, provider| {
                registry.with_provider(provider)
            });

        let settings = DispatchSettings::from(config.as_ref());
        let stats = DispatchStats::new();
        let status = StatusBoard::new();
        let stop = StopSignal::new();
        let (dispatcher, rx) = chat_queue(&settings, store.clone(), stats.clone(), stop.clone());

        let (selected_tx, selected_rx) = std::sync::mpsc::sync_channel(1);
        let probe_timeout = config.probe_timeout();
        let preferred = config.preferred_provider().clone();
        let worker = ChatWorker::new(
            rx,
            store.clone(),
            engine,
            None,
            settings,
            stats.clone(),
            status.clone(),
            stop.clone(),
        );
        let startup = async move {
            let availability = registry.probe_all(probe_timeout).await;
            let selected = select_provider(&preferred, &availability);
            let _ = selected_tx.send(selected);
            worker
                .with_provider(selected.and_then(|kind| registry.get(kind)))
                .run()
                .await;
        };
        let handle = WorkerHandle::spawn(WORKER_THREAD_NAME, stop, startup)?;

        let wait = probe_timeout + HANDSHAKE_GRACE;
        let provider = match selected_rx.recv_timeout(wait) {
            Ok(selected) => selected,
            Err(_) => {
                handle.stop(config.shutdown_timeout());
                return Err(WorkerError::new(WorkerErrorKind::StartupTimeout(
                    wait.as_millis() as u64,
                ))
                .into());
            }
        };

        *self.inner.session.lock() = Some(Arc::new(Session {
            config: config.clone(),
            store,
            dispatcher,
            stats,
            status,
            provider,
        }));
        lifecycle.worker = Some(handle);
        lifecycle.handlers = self.subscribe();

        info!(
            provider = ?provider,
            max_npcs = config.max_npc_count(),
            "NPC chat started"
        );
        Ok(StartOutcome::Started { provider })
    }

    /// Stop the worker, despawn every NPC and forget all state.
    #[instrument(skip(self))]
    pub fn stop(&self) -> StopReport {
        let mut lifecycle = self.inner.lifecycle.lock();
        let Some(session) = self.inner.session.lock().take() else {
            debug!("Stop requested while stopped");
            return StopReport::default();
        };

        if let Some(bus) = &self.inner.options.event_bus {
            for id in lifecycle.handlers.drain(..) {
                bus.unregister(id);
            }
        }

        let worker_joined = match lifecycle.worker.take() {
            Some(handle) => handle.stop(session.config.shutdown_timeout()),
            None => true,
        };
        let despawned = session.store.despawn_all();

        info!(worker_joined, despawned, "NPC chat stopped");
        StopReport {
            was_running: true,
            worker_joined,
            despawned,
        }
    }

    /// Spawn an NPC for a player who just joined, if auto-spawn is on.
    pub fn on_player_join(&self, player_id: &PlayerId, username: &str) -> Option<NpcId> {
        self.join(player_id, username, None)
    }

    /// Despawn every NPC a departing player owns.
    pub fn on_player_leave(&self, player_id: &PlayerId) -> Vec<NpcId> {
        let Some(session) = self.session() else {
            debug!(player = %player_id, "Leave ignored; not running");
            return Vec::new();
        };
        session.store.remove_npcs_for_player(player_id)
    }

    /// Spawn an NPC for a player regardless of the auto-spawn setting.
    pub fn spawn_npc_for(&self, player_id: &PlayerId, username: &str) -> Option<NpcId> {
        let session = self.session()?;
        Self::spawn(&session, player_id, username, None)
    }

    /// Queue a player's message for an NPC. Returns immediately.
    pub fn handle_chat(
        &self,
        npc_id: NpcId,
        player_id: &PlayerId,
        message: &str,
    ) -> EnqueueStatus {
        match self.session() {
            Some(session) => session
                .dispatcher
                .enqueue(npc_id, player_id.clone(), message),
            None => {
                debug!(npc = %npc_id, "Chat ignored; not running");
                EnqueueStatus::Stopped
            }
        }
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.inner.session.lock().is_some()
    }

    /// Backend chosen at start, if any.
    pub fn selected_provider(&self) -> Option<ProviderKind> {
        self.session().and_then(|session| session.provider)
    }

    /// What the worker is doing. `None` when stopped.
    pub fn status(&self) -> Option<DispatchStatus> {
        self.session().map(|session| session.status.get())
    }

    /// Pipeline counters for this run.
    pub fn stats(&self) -> StatsSnapshot {
        self.session()
            .map(|session| session.stats.snapshot())
            .unwrap_or_default()
    }

    /// Settings in effect for this run.
    pub fn config(&self) -> Option<Arc<EffectiveConfig>> {
        self.session().map(|session| session.config.clone())
    }

    /// Tracked NPCs.
    pub fn npc_count(&self) -> usize {
        self.session().map_or(0, |session| session.store.len())
    }

    /// NPCs owned by a player.
    pub fn npcs_for_player(&self, player_id: &PlayerId) -> Vec<NpcId> {
        self.session()
            .map(|session| session.store.npcs_for_player(player_id))
            .unwrap_or_default()
    }

    /// Snapshot of every tracked NPC, by id.
    pub fn npcs(&self) -> Vec<NpcRecord> {
        let Some(session) = self.session() else {
            return Vec::new();
        };
        session
            .store
            .ids()
            .into_iter()
            .filter_map(|id| session.store.get(id))
            .collect()
    }

    /// One NPC's conversation, oldest first.
    pub fn history(&self, npc_id: NpcId) -> Vec<ChatTurn> {
        self.session()
            .and_then(|session| session.store.history(npc_id))
            .map(Vec::from)
            .unwrap_or_default()
    }

    fn session(&self) -> Option<Arc<Session>> {
        self.inner.session.lock().clone()
    }

    fn join(&self, player_id: &PlayerId, username: &str, origin: Option<Position>) -> Option<NpcId> {
        let Some(session) = self.session() else {
            debug!(player = %player_id, "Join ignored; not running");
            return None;
        };
        if !session.config.auto_spawn_on_join() {
            debug!(player = %player_id, "Auto-spawn off");
            return None;
        }
        Self::spawn(&session, player_id, username, origin)
    }

    fn spawn(
        session: &Session,
        player_id: &PlayerId,
        username: &str,
        origin: Option<Position>,
    ) -> Option<NpcId> {
        match session.store.create_npc_near(player_id, username, origin) {
            Ok(id) => Some(id),
            Err(e) => {
                info!(player = %player_id, reason = %e.kind, "NPC not spawned");
                None
            }
        }
    }

    /// Register join, leave and chat handlers that hold only a weak reference.
    fn subscribe(&self) -> Vec<HandlerId> {
        let Some(bus) = &self.inner.options.event_bus else {
            return Vec::new();
        };
        let weak = Arc::downgrade(&self.inner);

        let route = move |event: &SessionEvent| {
            let Some(service) = upgrade(&weak) else {
                return;
            };
            match event {
                SessionEvent::PlayerJoined {
                    player_id,
                    username,
                    position,
                } => {
                    service.join(player_id, username, *position);
                }
                SessionEvent::PlayerLeft { player_id } => {
                    service.on_player_leave(player_id);
                }
                SessionEvent::Chat {
                    npc_id,
                    player_id,
                    message,
                } => {
                    let status = service.handle_chat(*npc_id, player_id, message);
                    if status != EnqueueStatus::Queued {
                        warn!(npc = %npc_id, status = %status, "Chat event not queued");
                    }
                }
            }
        };
        let route = Arc::new(route);

        [
            SessionEventKind::PlayerJoined,
            SessionEventKind::PlayerLeft,
            SessionEventKind::Chat,
        ]
        .into_iter()
        .map(|kind| {
            let route = route.clone();
            bus.register(kind, move |event| (*route)(event))
        })
        .collect()
    }
}

fn upgrade(weak: &Weak<Inner>) -> Option<NpcChatService> {
    weak.upgrade().map(|inner| NpcChatService { inner })
}

impl Drop for Inner {
    fn drop(&mut self) {
        let lifecycle = self.lifecycle.get_mut();
        if let Some(bus) = &self.options.event_bus {
            for id in lifecycle.handlers.drain(..) {
                bus.unregister(id);
            }
        }
        if let Some(session) = self.session.get_mut().take() {
            if let Some(handle) = lifecycle.worker.take() {
                handle.stop(session.config.shutdown_timeout());
            }
            session.store.despawn_all();
        }
    }
}
