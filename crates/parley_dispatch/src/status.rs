//! What the worker is doing right now.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Worker state machine: `Offline -> Idle <-> Working -> Offline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum DispatchState {
    /// Not started, or stopped
    Offline,
    /// Waiting on the queue
    Idle,
    /// Provider call in flight
    Working,
}

/// State plus a human-readable detail and when it last changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchStatus {
    /// Current state
    pub state: DispatchState,
    /// Short description, e.g. which NPC is being answered
    pub detail: String,
    /// When `state` or `detail` last changed
    pub since: Instant,
}

/// Shared cell holding the current [`DispatchStatus`].
#[derive(Debug, Clone)]
pub struct StatusBoard {
    inner: Arc<Mutex<DispatchStatus>>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    /// Board starting `Offline`.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(DispatchStatus {
                state: DispatchState::Offline,
                detail: "not started".to_string(),
                since: Instant::now(),
            })),
        }
    }

    /// Replace the current status.
    pub fn set(&self, state: DispatchState, detail: impl Into<String>) {
        *self.inner.lock() = DispatchStatus {
            state,
            detail: detail.into(),
            since: Instant::now(),
        };
    }

    /// Copy of the current status.
    pub fn get(&self) -> DispatchStatus {
        self.inner.lock().clone()
    }

    /// Current state only.
    pub fn state(&self) -> DispatchState {
        self.inner.lock().state
    }
}
