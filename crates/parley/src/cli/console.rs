//! An engine that prints to the terminal.

use parking_lot::Mutex;
use parley::{EngineBoundary, NpcId, PlayerId, Position};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Stands in for the game engine: entities are lines on stdout.
#[derive(Debug, Default)]
pub struct ConsoleEngine {
    mod_config: Option<serde_json::Value>,
    names: Mutex<HashMap<NpcId, String>>,
    positions: Mutex<HashMap<PlayerId, Position>>,
}

impl ConsoleEngine {
    /// Engine whose mod config is read from a JSON file, if given.
    ///
    /// An unreadable or malformed file is logged and treated as absent.
    pub fn new(mod_config: Option<&Path>) -> Self {
        let mod_config = mod_config.and_then(|path| {
            let text = std::fs::read_to_string(path)
                .map_err(|e| warn!(path = %path.display(), error = %e, "Cannot read mod config"))
                .ok()?;
            serde_json::from_str(&text)
                .map_err(|e| warn!(path = %path.display(), error = %e, "Mod config is not JSON"))
                .ok()
        });
        Self {
            mod_config,
            ..Self::default()
        }
    }

    /// Remember where a player stands.
    pub fn place_player(&self, player_id: &PlayerId, position: Position) {
        self.positions.lock().insert(player_id.clone(), position);
    }

    fn name_of(&self, npc_id: NpcId) -> String {
        self.names
            .lock()
            .get(&npc_id)
            .cloned()
            .unwrap_or_else(|| format!("npc {}", npc_id))
    }
}

impl EngineBoundary for ConsoleEngine {
    fn spawn_entity(&self, npc_id: NpcId, display_name: &str, position: Position, tag: &str) {
        self.names.lock().insert(npc_id, display_name.to_string());
        println!(
            "+ [{}] {} appears at ({:.1}, {:.1}, {:.1}) <{}>",
            npc_id, display_name, position.x, position.y, position.z, tag
        );
    }

    fn despawn_entity(&self, npc_id: NpcId) {
        let name = self
            .names
            .lock()
            .remove(&npc_id)
            .unwrap_or_else(|| format!("npc {}", npc_id));
        println!("- [{}] {} wanders off", npc_id, name);
    }

    fn emit_speech(&self, npc_id: NpcId, text: &str) {
        println!("[{}] <{}> {}", npc_id, self.name_of(npc_id), text);
    }

    fn is_server_context(&self) -> bool {
        true
    }

    fn mod_config(&self, _mod_id: &str) -> Option<serde_json::Value> {
        self.mod_config.clone()
    }

    fn player_position(&self, player_id: &PlayerId) -> Option<Position> {
        self.positions.lock().get(player_id).copied()
    }
}
