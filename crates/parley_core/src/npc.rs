//! NPC records and conversation history.

use crate::{NpcId, Personality, PlayerId, Position};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One completed exchange: what the player said and what the NPC answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ChatTurn {
    /// The player's utterance
    player_message: String,
    /// The NPC's reply
    npc_reply: String,
}

impl ChatTurn {
    /// Create a turn.
    pub fn new(player_message: impl Into<String>, npc_reply: impl Into<String>) -> Self {
        Self {
            player_message: player_message.into(),
            npc_reply: npc_reply.into(),
        }
    }
}

/// What a provider needs to keep an NPC in character.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct NpcContext {
    /// NPC being voiced
    npc_id: NpcId,
    /// Name shown in game
    display_name: String,
    /// Personality tag
    personality: Personality,
    /// Display name of the NPC's owner, who the prompt addresses
    player_name: String,
}

impl NpcContext {
    /// Create a context.
    pub fn new(
        npc_id: NpcId,
        display_name: impl Into<String>,
        personality: Personality,
        player_name: impl Into<String>,
    ) -> Self {
        Self {
            npc_id,
            display_name: display_name.into(),
            personality,
            player_name: player_name.into(),
        }
    }
}

/// A tracked NPC.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct NpcRecord {
    /// Unique id
    id: NpcId,
    /// Owning player
    owner: PlayerId,
    /// Owning player's display name
    owner_name: String,
    /// Personality tag
    personality: Personality,
    /// Name shown in game
    display_name: String,
    /// Where the NPC was spawned
    position: Position,
    /// Oldest-first conversation history
    history: VecDeque<ChatTurn>,
}

impl NpcRecord {
    /// Create a record with empty history. The display name is derived from
    /// the personality.
    pub fn new(
        id: NpcId,
        owner: PlayerId,
        owner_name: impl Into<String>,
        personality: Personality,
        position: Position,
    ) -> Self {
        let display_name = personality.display_name();
        Self {
            id,
            owner,
            owner_name: owner_name.into(),
            personality,
            display_name,
            position,
            history: VecDeque::new(),
        }
    }

    /// Append a turn, then evict from the front until at most `limit` remain.
    ///
    /// # Examples
    ///
    /// ```
    /// use parley_core::{ChatTurn, NpcId, NpcRecord, Personality, PlayerId, Position};
    ///
    /// let mut npc = NpcRecord::new(
    ///     NpcId(1),
    ///     PlayerId::new("p1"),
    ///     "Alex",
    ///     Personality::new("wise"),
    ///     Position::default(),
    /// );
    /// for text in ["A", "B", "C"] {
    ///     npc.push_turn(ChatTurn::new(text, "ok"), 2);
    /// }
    /// let kept: Vec<_> = npc.history().iter().map(|t| t.player_message().as_str()).collect();
    /// assert_eq!(kept, ["B", "C"]);
    /// ```
    pub fn push_turn(&mut self, turn: ChatTurn, limit: usize) {
        self.history.push_back(turn);
        while self.history.len() > limit {
            self.history.pop_front();
        }
    }

    /// Context for a provider call.
    ///
    /// Each NPC is a companion bound to one player, so the prompt always
    /// names the owner. Messages from other players are answered as if the
    /// owner had spoken; their ids only appear in logs.
    pub fn context(&self) -> NpcContext {
        NpcContext::new(
            self.id,
            self.display_name.clone(),
            self.personality.clone(),
            self.owner_name.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> NpcRecord {
        NpcRecord::new(
            NpcId(9),
            PlayerId::new("p"),
            "Sam",
            Personality::new("cheerful"),
            Position::default(),
        )
    }

    #[test]
    fn zero_limit_keeps_nothing() {
        let mut npc = record();
        npc.push_turn(ChatTurn::new("hi", "hello"), 0);
        assert!(npc.history().is_empty());
    }

    #[test]
    fn context_carries_owner_and_personality() {
        let npc = record();
        let ctx = npc.context();
        assert_eq!(*ctx.npc_id(), NpcId(9));
        assert_eq!(ctx.player_name(), "Sam");
        assert_eq!(ctx.display_name(), "Cheerful Farmer");
        assert_eq!(ctx.personality().as_str(), "cheerful");
    }
}
