//! Chat dispatch for the Parley NPC chat extension.
//!
//! Player messages never wait on a language model. [`ChatDispatcher`] drops
//! each message into a bounded queue and returns at once; a single
//! [`ChatWorker`] drains the queue on its own thread (see [`WorkerHandle`]),
//! calls the selected provider under a time budget and speaks the reply, or a
//! canned fallback line, through the engine.
//!
//! # Example
//!
//! ```no_run
//! use parley_dispatch::{DispatchStats, StatusBoard, StopSignal, WorkerHandle};
//! use std::time::Duration;
//!
//! let stop = StopSignal::new();
//! let handle = WorkerHandle::spawn("npc-chat-worker", stop.clone(), async {})?;
//! assert!(handle.stop(Duration::from_secs(2)));
//! # Ok::<(), parley_error::WorkerError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod dispatcher;
mod handle;
mod settings;
mod stats;
mod status;
mod worker;

pub use dispatcher::{ChatDispatcher, EnqueueStatus, chat_queue};
pub use handle::{StopSignal, WorkerHandle};
pub use settings::DispatchSettings;
pub use stats::{DispatchStats, StatsSnapshot};
pub use status::{DispatchState, DispatchStatus, StatusBoard};
pub use worker::{CALL_FAILED_REPLY, ChatWorker, NO_PROVIDER_REPLY};
