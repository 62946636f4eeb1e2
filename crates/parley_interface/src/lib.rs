//! Trait definitions for the Parley NPC chat extension.
//!
//! Two seams separate the core from the outside world:
//! - [`EngineBoundary`]: the game engine the core drives (spawning, speech, config)
//! - [`ChatProvider`]: a language-model backend that turns a prompt into a reply

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod provider;

pub use engine::{EngineBoundary, NPC_ENTITY_TAG};
pub use provider::ChatProvider;
