//! Tests for engine event adaptation and the event bus.

use anyhow::Context;
use parking_lot::Mutex;
use parley::{EventBus, HandlerId, NpcId, PlayerId, Position, SessionEvent, SessionEventKind};
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_player_join_payload_with_numeric_id() -> anyhow::Result<()> {
    let event = SessionEvent::from_engine(
        "player_join",
        &json!({ "playerId": 42, "username": "Alex", "x": 1.5, "y": 64.0, "z": -3.0 }),
    )
    .context("join adapts")?;

    assert_eq!(
        event,
        SessionEvent::PlayerJoined {
            player_id: PlayerId::new("42"),
            username: "Alex".to_string(),
            position: Some(Position::new(1.5, 64.0, -3.0)),
        }
    );
    Ok(())
}

#[test]
fn test_event_names_are_normalized() {
    let payload = json!({ "player_id": "uuid-1" });
    for name in ["PlayerLeaveEvent", "player-left", "PLAYER_QUIT", "playerleave"] {
        assert_eq!(
            SessionEvent::from_engine(name, &payload).map(|e| e.kind()),
            Some(SessionEventKind::PlayerLeft),
            "{name}"
        );
    }
}

#[test]
fn test_join_defaults_name_and_skips_partial_position() {
    let event = SessionEvent::from_engine("PlayerJoinEvent", &json!({ "uuid": "u", "x": 1.0 }));
    assert_eq!(
        event,
        Some(SessionEvent::PlayerJoined {
            player_id: PlayerId::new("u"),
            username: "Traveler".to_string(),
            position: None,
        })
    );
}

#[test]
fn test_chat_requires_npc_player_and_text() -> anyhow::Result<()> {
    let event = SessionEvent::from_engine(
        "npc_chat",
        &json!({ "npcId": "3", "playerId": 9, "message": "hi there" }),
    )
    .context("chat adapts")?;
    assert_eq!(
        event,
        SessionEvent::Chat {
            npc_id: NpcId(3),
            player_id: PlayerId::new("9"),
            message: "hi there".to_string(),
        }
    );

    assert!(SessionEvent::from_engine("chat", &json!({ "npcId": 3, "playerId": 9 })).is_none());
    assert!(SessionEvent::from_engine("chat", &json!({ "npcId": -1, "playerId": 9, "text": "x" })).is_none());
    assert!(SessionEvent::from_engine("player_join", &json!({ "playerId": "" })).is_none());
    assert!(SessionEvent::from_engine("block_break", &json!({ "playerId": 1 })).is_none());
    Ok(())
}

#[test]
fn test_bus_routes_by_kind() {
    let bus = EventBus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let joins = {
        let seen = seen.clone();
        bus.register(SessionEventKind::PlayerJoined, move |event| {
            seen.lock().push(event.kind());
        })
    };
    let leaves = {
        let seen = seen.clone();
        bus.register(SessionEventKind::PlayerLeft, move |event| {
            seen.lock().push(event.kind());
        })
    };
    assert_ne!(joins, leaves);
    assert_eq!(bus.len(), 2);

    let left = SessionEvent::PlayerLeft {
        player_id: PlayerId::new("p"),
    };
    assert_eq!(bus.publish(&left), 1);
    assert_eq!(
        bus.publish(&SessionEvent::Chat {
            npc_id: NpcId(1),
            player_id: PlayerId::new("p"),
            message: "hi".to_string(),
        }),
        0
    );
    assert_eq!(seen.lock().as_slice(), &[SessionEventKind::PlayerLeft]);

    assert!(bus.unregister(leaves));
    assert!(!bus.unregister(leaves));
    assert_eq!(bus.publish(&left), 0);
    assert_eq!(bus.len(), 1);
}

#[test]
fn test_handler_may_unregister_itself() {
    let bus = Arc::new(EventBus::new());
    let own_id: Arc<Mutex<Option<HandlerId>>> = Arc::new(Mutex::new(None));

    let id = {
        let weak = Arc::downgrade(&bus);
        let own_id = own_id.clone();
        bus.register(SessionEventKind::PlayerLeft, move |_| {
            let id = *own_id.lock();
            if let (Some(bus), Some(id)) = (weak.upgrade(), id) {
                bus.unregister(id);
            }
        })
    };
    *own_id.lock() = Some(id);

    let event = SessionEvent::PlayerLeft {
        player_id: PlayerId::new("p"),
    };
    assert_eq!(bus.publish(&event), 1);
    assert!(bus.is_empty());
    assert_eq!(bus.publish(&event), 0);
}
