//! Typed session events and the bus that routes them.

use parking_lot::Mutex;
use parley_core::{NpcId, PlayerId, Position};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Which events a handler wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SessionEventKind {
    /// A player entered the world
    PlayerJoined,
    /// A player disconnected
    PlayerLeft,
    /// A player spoke to an NPC
    Chat,
}

/// Something that happened in the host's session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A player entered the world.
    PlayerJoined {
        /// Engine player id
        player_id: PlayerId,
        /// Display name
        username: String,
        /// Where the player appeared, when the engine says
        position: Option<Position>,
    },
    /// A player disconnected.
    PlayerLeft {
        /// Engine player id
        player_id: PlayerId,
    },
    /// A player addressed an NPC.
    Chat {
        /// NPC spoken to
        npc_id: NpcId,
        /// Who spoke
        player_id: PlayerId,
        /// What was said
        message: String,
    },
}

impl SessionEvent {
    /// The kind used for handler routing.
    pub fn kind(&self) -> SessionEventKind {
        match self {
            SessionEvent::PlayerJoined { .. } => SessionEventKind::PlayerJoined,
            SessionEvent::PlayerLeft { .. } => SessionEventKind::PlayerLeft,
            SessionEvent::Chat { .. } => SessionEventKind::Chat,
        }
    }

    /// Adapt an engine event given as a name and a JSON payload.
    ///
    /// Names are matched ignoring case, underscores and a trailing `event`,
    /// so `player_join`, `PlayerJoinEvent` and `player_joined` all work. Ids
    /// may be strings or numbers and keys may be snake or camel case. Returns
    /// `None` for events this crate does not care about or payloads missing a
    /// required field.
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::{SessionEvent, SessionEventKind};
    /// use serde_json::json;
    ///
    /// let event = SessionEvent::from_engine(
    ///     "player_join",
    ///     &json!({ "playerId": 42, "username": "Alex", "x": 1.0, "y": 64.0, "z": -3.5 }),
    /// )
    /// .unwrap();
    /// assert_eq!(event.kind(), SessionEventKind::PlayerJoined);
    ///
    /// assert!(SessionEvent::from_engine("block_break", &json!({})).is_none());
    /// ```
    pub fn from_engine(name: &str, payload: &Value) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        let normalized = normalized.strip_suffix("event").unwrap_or(&normalized);

        let event = match normalized {
            "playerjoin" | "playerjoined" => SessionEvent::PlayerJoined {
                player_id: player_id(payload)?,
                username: text_field(payload, &["username", "name", "playerName", "player_name"])
                    .unwrap_or_else(|| "Traveler".to_string()),
                position: position(payload),
            },
            "playerleave" | "playerleft" | "playerquit" => SessionEvent::PlayerLeft {
                player_id: player_id(payload)?,
            },
            "chat" | "npcchat" | "playerchat" => SessionEvent::Chat {
                npc_id: npc_id(payload)?,
                player_id: player_id(payload)?,
                message: text_field(payload, &["message", "text"])?,
            },
            _ => {
                trace!(name, "Ignoring engine event");
                return None;
            }
        };
        Some(event)
    }
}

fn field<'a>(payload: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| payload.get(*key))
}

fn text_field(payload: &Value, keys: &[&str]) -> Option<String> {
    field(payload, keys)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn player_id(payload: &Value) -> Option<PlayerId> {
    match field(payload, &["player_id", "playerId", "uuid"])? {
        Value::String(id) if !id.is_empty() => Some(PlayerId::new(id.as_str())),
        Value::Number(id) => Some(PlayerId::new(id.to_string())),
        _ => None,
    }
}

fn npc_id(payload: &Value) -> Option<NpcId> {
    match field(payload, &["npc_id", "npcId"])? {
        Value::Number(id) => id.as_u64().map(NpcId),
        Value::String(id) => id.trim().parse().ok().map(NpcId),
        _ => None,
    }
}

fn position(payload: &Value) -> Option<Position> {
    let coordinate = |key: &str| payload.get(key).and_then(Value::as_f64);
    Some(Position::new(
        coordinate("x")?,
        coordinate("y")?,
        coordinate("z")?,
    ))
}

/// Token returned by [`EventBus::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub struct HandlerId(u64);

type Handler = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// Routes [`SessionEvent`]s to registered handlers.
///
/// Handlers run on the publishing thread, outside the registry lock, so a
/// handler may itself register, unregister or publish.
#[derive(Default)]
pub struct EventBus {
    handlers: Mutex<Vec<(HandlerId, SessionEventKind, Handler)>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.lock().len())
            .finish()
    }
}

impl EventBus {
    /// Empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `handler` for every published event of `kind`.
    pub fn register<F>(&self, kind: SessionEventKind, handler: F) -> HandlerId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.lock().push((id, kind, Arc::new(handler)));
        debug!(handler = %id, kind = %kind, "Registered event handler");
        id
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn unregister(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.lock();
        let before = handlers.len();
        handlers.retain(|(handler_id, _, _)| *handler_id != id);
        before != handlers.len()
    }

    /// Deliver `event` to every matching handler. Returns how many ran.
    pub fn publish(&self, event: &SessionEvent) -> usize {
        let kind = event.kind();
        let matching: Vec<Handler> = self
            .handlers
            .lock()
            .iter()
            .filter(|(_, handler_kind, _)| *handler_kind == kind)
            .map(|(_, _, handler)| handler.clone())
            .collect();

        for handler in &matching {
            handler(event);
        }
        matching.len()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
