//! Core data types for the Parley NPC chat extension.
//!
//! This crate provides the plain data shared by the store, the dispatcher and
//! the provider drivers. Nothing here performs IO.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod ids;
mod job;
mod message;
mod npc;
mod personality;
mod position;
mod provider;
mod role;
mod telemetry;

pub use ids::{NpcId, PlayerId};
pub use job::ChatJob;
pub use message::Message;
pub use npc::{ChatTurn, NpcContext, NpcRecord};
pub use personality::{DEFAULT_PERSONALITIES, GENERIC_GREETING, Personality};
pub use position::Position;
pub use provider::ProviderKind;
pub use role::Role;
pub use telemetry::init_telemetry;
