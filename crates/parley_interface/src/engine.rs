//! The game engine as seen from the core.

use parley_core::{NpcId, PlayerId, Position};

/// Entity tag attached to every NPC this extension spawns.
pub const NPC_ENTITY_TAG: &str = "ai_npc";

/// Calls the core makes into the host engine.
///
/// Every method is fire-and-forget: implementations must not block for long
/// and must not panic. Calls may arrive from the engine's event thread and from
/// the background worker thread, hence `Send + Sync`.
pub trait EngineBoundary: Send + Sync {
    /// Place an NPC entity in the world.
    fn spawn_entity(&self, npc_id: NpcId, display_name: &str, position: Position, tag: &str);

    /// Remove an NPC entity from the world.
    fn despawn_entity(&self, npc_id: NpcId);

    /// Show a line of speech above an NPC.
    fn emit_speech(&self, npc_id: NpcId, text: &str);

    /// Whether this process is the authoritative server.
    fn is_server_context(&self) -> bool;

    /// The engine's parsed configuration for a mod, if it has one.
    fn mod_config(&self, mod_id: &str) -> Option<serde_json::Value>;

    /// Where a player currently stands. Spawns fall back to the origin when
    /// the engine cannot say.
    fn player_position(&self, _player_id: &PlayerId) -> Option<Position> {
        None
    }
}
