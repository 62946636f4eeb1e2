//! NPC population management for the Parley NPC chat extension.
//!
//! [`NpcStore`] owns every tracked NPC and the per-player ownership index,
//! drawing ids from a shared [`NpcIdSource`]. It enforces the population caps, places and greets new NPCs,
//! and is the only place conversation history lives.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod ids;
mod placement;
mod store;

pub use ids::NpcIdSource;
pub use placement::spawn_offset;
pub use store::NpcStore;
