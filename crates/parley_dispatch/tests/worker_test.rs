//! Tests for the chat queue and worker.

use async_trait::async_trait;
use parking_lot::Mutex;
use parley_config::EffectiveConfig;
use parley_core::{ChatJob, ChatTurn, NpcContext, NpcId, PlayerId, Position, ProviderKind};
use parley_dispatch::{
    CALL_FAILED_REPLY, ChatDispatcher, ChatWorker, DispatchSettings, DispatchState, DispatchStats,
    EnqueueStatus, NO_PROVIDER_REPLY, StatusBoard, StopSignal, WorkerHandle, chat_queue,
};
use parley_error::{ProviderError, ProviderErrorKind, ProviderResult};
use parley_interface::{ChatProvider, EngineBoundary};
use parley_npc::NpcStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Default)]
struct SpeechLog {
    lines: Mutex<Vec<(NpcId, String)>>,
}

impl SpeechLog {
    fn lines_for(&self, npc_id: NpcId) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(id, _)| *id == npc_id)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl EngineBoundary for SpeechLog {
    fn spawn_entity(&self, _npc_id: NpcId, _name: &str, _position: Position, _tag: &str) {}

    fn despawn_entity(&self, _npc_id: NpcId) {}

    fn emit_speech(&self, npc_id: NpcId, text: &str) {
        self.lines.lock().push((npc_id, text.to_string()));
    }

    fn is_server_context(&self) -> bool {
        true
    }

    fn mod_config(&self, _mod_id: &str) -> Option<serde_json::Value> {
        None
    }
}

enum Script {
    Echo,
    Reply(&'static str),
    Fail,
}

struct ScriptedProvider {
    script: Script,
    delay: Duration,
    calls: Mutex<Vec<(String, usize)>>,
}

impl ScriptedProvider {
    fn new(script: Script) -> Self {
        Self {
            script,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn delayed(script: Script, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(script)
        }
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn is_available(&self, _probe_timeout: Duration) -> bool {
        true
    }

    async fn generate_response(
        &self,
        _context: &NpcContext,
        history: &[ChatTurn],
        message: &str,
        _timeout: Duration,
    ) -> ProviderResult<String> {
        self.calls.lock().push((message.to_string(), history.len()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.script {
            Script::Echo => Ok(format!("re: {}", message)),
            Script::Reply(text) => Ok(text.to_string()),
            Script::Fail => Err(ProviderError::new(
                "ollama",
                ProviderErrorKind::Http("connection refused".to_string()),
            )),
        }
    }
}

struct Harness {
    engine: Arc<SpeechLog>,
    store: Arc<NpcStore>,
    stats: DispatchStats,
    status: StatusBoard,
    stop: StopSignal,
    dispatcher: ChatDispatcher,
    rx: Option<mpsc::Receiver<ChatJob>>,
    settings: DispatchSettings,
    player: PlayerId,
    npc: NpcId,
}

impl Harness {
    fn new(settings: DispatchSettings) -> Self {
        let engine = Arc::new(SpeechLog::default());
        let store = Arc::new(NpcStore::new(
            Arc::new(EffectiveConfig::default()),
            engine.clone(),
        ));
        let player = PlayerId::new("p1");
        let npc = store.create_npc(&player, "Alex").unwrap();

        let stats = DispatchStats::new();
        let stop = StopSignal::new();
        let (dispatcher, rx) = chat_queue(&settings, store.clone(), stats.clone(), stop.clone());

        Self {
            engine,
            store,
            stats,
            status: StatusBoard::new(),
            stop,
            dispatcher,
            rx: Some(rx),
            settings,
            player,
            npc,
        }
    }

    fn worker(&mut self, provider: Option<Arc<dyn ChatProvider>>) -> ChatWorker {
        ChatWorker::new(
            self.rx.take().expect("worker already built"),
            self.store.clone(),
            self.engine.clone(),
            provider,
            self.settings.clone(),
            self.stats.clone(),
            self.status.clone(),
            self.stop.clone(),
        )
    }

    fn job(&self, message: &str) -> ChatJob {
        ChatJob::new(self.npc, self.player.clone(), message)
    }

    /// Speech after the greeting.
    fn replies(&self) -> Vec<String> {
        self.engine.lines_for(self.npc).into_iter().skip(1).collect()
    }
}

fn fast_settings() -> DispatchSettings {
    DispatchSettings::default()
        .with_poll_interval(Duration::from_millis(20))
        .with_response_timeout(Duration::from_millis(200))
}

fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    done()
}

#[test]
fn test_jobs_are_answered_in_order() {
    let mut harness = Harness::new(fast_settings());
    let provider = Arc::new(ScriptedProvider::new(Script::Echo));
    let worker = harness.worker(Some(provider.clone()));

    for message in ["first", "second", "third"] {
        assert_eq!(
            harness
                .dispatcher
                .enqueue(harness.npc, harness.player.clone(), message),
            EnqueueStatus::Queued
        );
    }

    let handle = WorkerHandle::spawn("npc-chat-worker", harness.stop.clone(), worker.run()).unwrap();
    assert!(wait_until(Duration::from_secs(5), || harness.replies().len() == 3));
    assert!(handle.stop(Duration::from_secs(2)));

    assert_eq!(
        harness.replies(),
        vec!["re: first", "re: second", "re: third"]
    );
    let calls = provider.calls.lock().clone();
    assert_eq!(
        calls,
        vec![
            ("first".to_string(), 0),
            ("second".to_string(), 1),
            ("third".to_string(), 2)
        ]
    );
    assert_eq!(harness.stats.snapshot().replied, 3);
    assert_eq!(harness.status.state(), DispatchState::Offline);
}

#[tokio::test]
async fn test_history_is_trimmed_to_limit() {
    let mut harness = Harness::new(fast_settings().with_history_limit(2usize));
    let worker = harness.worker(Some(Arc::new(ScriptedProvider::new(Script::Echo))));

    for message in ["a", "b", "c"] {
        worker.process(harness.job(message)).await;
    }

    let history = harness.store.history(harness.npc).unwrap();
    let kept: Vec<&str> = history
        .iter()
        .map(|turn| turn.player_message().as_str())
        .collect();
    assert_eq!(kept, vec!["b", "c"]);
    assert_eq!(history.back().unwrap().npc_reply(), "re: c");
}

#[tokio::test]
async fn test_timeout_speaks_fallback_and_keeps_history() {
    let mut harness = Harness::new(fast_settings().with_response_timeout(Duration::from_millis(50)));
    let worker = harness.worker(Some(Arc::new(ScriptedProvider::delayed(
        Script::Reply("too late"),
        Duration::from_millis(500),
    ))));

    let started = Instant::now();
    worker.process(harness.job("hello?")).await;

    assert!(started.elapsed() < Duration::from_millis(400));
    assert_eq!(harness.replies(), vec![CALL_FAILED_REPLY]);
    assert!(harness.store.history(harness.npc).unwrap().is_empty());
    assert_eq!(harness.stats.snapshot().failed, 1);
}

#[tokio::test]
async fn test_provider_error_speaks_fallback() {
    let mut harness = Harness::new(fast_settings());
    let worker = harness.worker(Some(Arc::new(ScriptedProvider::new(Script::Fail))));

    worker.process(harness.job("hello")).await;

    assert_eq!(harness.replies(), vec![CALL_FAILED_REPLY]);
    assert!(harness.store.history(harness.npc).unwrap().is_empty());
}

#[tokio::test]
async fn test_no_provider_speaks_canned_line() {
    let mut harness = Harness::new(fast_settings());
    let worker = harness.worker(None);

    worker.process(harness.job("hello")).await;

    assert_eq!(harness.replies(), vec![NO_PROVIDER_REPLY]);
    assert!(harness.store.history(harness.npc).unwrap().is_empty());
    assert_eq!(harness.stats.snapshot().no_provider, 1);
}

#[tokio::test]
async fn test_job_for_removed_npc_is_dropped() {
    let mut harness = Harness::new(fast_settings());
    let provider = Arc::new(ScriptedProvider::new(Script::Echo));
    let worker = harness.worker(Some(provider.clone()));

    let job = harness.job("are you there?");
    harness.store.remove_npcs_for_player(&harness.player);
    worker.process(job).await;

    assert!(harness.replies().is_empty());
    assert!(provider.calls.lock().is_empty());
    assert_eq!(harness.stats.snapshot().dropped_missing, 1);
}

#[tokio::test]
async fn test_npc_removed_during_call_discards_reply() {
    let mut harness = Harness::new(fast_settings().with_response_timeout(Duration::from_secs(2)));
    let worker = harness.worker(Some(Arc::new(ScriptedProvider::delayed(
        Script::Reply("hello"),
        Duration::from_millis(100),
    ))));

    let store = harness.store.clone();
    let player = harness.player.clone();
    let remover = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        store.remove_npcs_for_player(&player);
    });

    worker.process(harness.job("hi")).await;
    remover.await.unwrap();

    assert!(harness.replies().is_empty());
    assert!(harness.store.history(harness.npc).is_none());
}

#[tokio::test]
async fn test_stale_job_is_dropped() {
    let mut harness = Harness::new(fast_settings().with_max_job_age(Some(Duration::from_millis(5))));
    let provider = Arc::new(ScriptedProvider::new(Script::Echo));
    let worker = harness.worker(Some(provider.clone()));

    let job = harness.job("old news");
    tokio::time::sleep(Duration::from_millis(30)).await;
    worker.process(job).await;

    assert!(harness.replies().is_empty());
    assert!(provider.calls.lock().is_empty());
    assert_eq!(harness.stats.snapshot().dropped_stale, 1);
}

#[tokio::test]
async fn test_reasoning_is_filtered_when_enabled() {
    let mut harness = Harness::new(fast_settings());
    let worker = harness.worker(Some(Arc::new(ScriptedProvider::new(Script::Reply(
        "<reasoning>be grumpy</reasoning>\nHmph. Fine.",
    )))));

    worker.process(harness.job("hello")).await;
    assert_eq!(harness.replies(), vec!["Hmph. Fine."]);
}

#[tokio::test]
async fn test_reasoning_kept_when_filter_disabled() {
    let mut harness = Harness::new(fast_settings().with_filter_reasoning(false));
    let worker = harness.worker(Some(Arc::new(ScriptedProvider::new(Script::Reply(
        "Thought: wave\nHello!",
    )))));

    worker.process(harness.job("hello")).await;
    assert_eq!(harness.replies(), vec!["Thought: wave\nHello!"]);
}

#[test]
fn test_enqueue_rejections() {
    let mut harness = Harness::new(fast_settings().with_queue_capacity(1usize));
    let _worker = harness.worker(None);

    assert_eq!(
        harness
            .dispatcher
            .enqueue(NpcId(999), harness.player.clone(), "hi"),
        EnqueueStatus::UnknownNpc
    );
    assert_eq!(
        harness
            .dispatcher
            .enqueue(harness.npc, harness.player.clone(), "one"),
        EnqueueStatus::Queued
    );
    assert_eq!(
        harness
            .dispatcher
            .enqueue(harness.npc, harness.player.clone(), "two"),
        EnqueueStatus::QueueFull
    );

    harness.stop.raise();
    assert_eq!(
        harness
            .dispatcher
            .enqueue(harness.npc, harness.player.clone(), "three"),
        EnqueueStatus::Stopped
    );

    let snapshot = harness.stats.snapshot();
    assert_eq!(snapshot.enqueued, 1);
    assert_eq!(snapshot.rejected_full, 1);
    assert_eq!(snapshot.rejected_unknown, 1);
}

#[test]
fn test_stop_with_pending_jobs_finishes_promptly() {
    let mut harness = Harness::new(fast_settings().with_response_timeout(Duration::from_secs(1)));
    let provider = Arc::new(ScriptedProvider::delayed(
        Script::Echo,
        Duration::from_millis(100),
    ));
    let worker = harness.worker(Some(provider.clone()));

    for n in 0..10 {
        harness
            .dispatcher
            .enqueue(harness.npc, harness.player.clone(), format!("m{}", n));
    }

    let handle = WorkerHandle::spawn("npc-chat-worker", harness.stop.clone(), worker.run()).unwrap();
    assert!(wait_until(Duration::from_secs(2), || !provider
        .calls
        .lock()
        .is_empty()));

    let started = Instant::now();
    assert!(handle.stop(Duration::from_secs(2)));
    assert!(started.elapsed() < Duration::from_secs(2));

    assert!(harness.replies().len() < 10);
    assert_eq!(harness.status.state(), DispatchState::Offline);
    assert_eq!(
        harness
            .dispatcher
            .enqueue(harness.npc, harness.player.clone(), "late"),
        EnqueueStatus::Stopped
    );
}
