//! Parley: conversational NPCs for voxel game servers.
//!
//! When a player joins, Parley spawns a villager with a random personality
//! next to them. When the player talks to it, the message is queued and a
//! background worker asks a language model (local Ollama, Gemini, OpenAI or
//! OpenRouter) for an in-character reply, which the NPC then speaks. The game
//! thread never waits on the network.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use parley::{NpcChatService, ServiceOptions, StartOutcome};
//! use std::sync::Arc;
//!
//! let service = NpcChatService::new(Arc::new(MyEngine::new()), ServiceOptions::default());
//! if let StartOutcome::Started { provider } = service.start()? {
//!     println!("talking through {:?}", provider);
//! }
//! service.on_player_join(&"player-1".into(), "Alex");
//! // ... later
//! service.stop();
//! ```
//!
//! # Architecture
//!
//! - `parley_error` - Error types
//! - `parley_core` - Plain data (ids, personalities, NPC records, jobs)
//! - `parley_interface` - `EngineBoundary` and `ChatProvider` traits
//! - `parley_config` - Layered settings
//! - `parley_models` - HTTP drivers, probing and provider selection
//! - `parley_npc` - NPC population and history
//! - `parley_dispatch` - Chat queue and background worker
//!
//! This crate wires them together and re-exports the pieces embedders need.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod events;
mod service;

pub use events::{EventBus, HandlerId, SessionEvent, SessionEventKind};
pub use service::{
    DEFAULT_MOD_ID, NpcChatService, ServiceOptions, StartOutcome, StopReport, WORKER_THREAD_NAME,
};

pub use parley_config::{EffectiveConfig, ProviderSettings, resolve};
pub use parley_core::{
    ChatTurn, NpcId, NpcRecord, Personality, PlayerId, Position, ProviderKind, init_telemetry,
};
pub use parley_dispatch::{
    CALL_FAILED_REPLY, DispatchState, DispatchStatus, EnqueueStatus, NO_PROVIDER_REPLY,
    StatsSnapshot,
};
pub use parley_error::{ParleyError, ParleyErrorKind, ParleyResult};
pub use parley_interface::{ChatProvider, EngineBoundary, NPC_ENTITY_TAG};
