//! The NPC map, ownership index and id counter behind one lock.

use crate::NpcIdSource;
use crate::placement::spawn_offset;
use parking_lot::Mutex;
use parley_config::EffectiveConfig;
use parley_core::{ChatTurn, NpcContext, NpcId, NpcRecord, Personality, PlayerId, Position};
use parley_error::{StoreError, StoreErrorKind, StoreResult};
use parley_interface::{EngineBoundary, NPC_ENTITY_TAG};
use rand::seq::SliceRandom;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default)]
struct Population {
    npcs: HashMap<NpcId, NpcRecord>,
    by_player: HashMap<PlayerId, Vec<NpcId>>,
    closed: bool,
}

/// Tracks every NPC this extension has spawned.
///
/// All bookkeeping sits behind a single mutex that is never held across an
/// engine call. Engine side effects (spawn, greeting, despawn) happen after
/// that lock is released, under a second lock that only orders them: the
/// engine never sees a despawn before the matching spawn.
///
/// [`despawn_all`](Self::despawn_all) closes the store; later creations fail
/// with [`StoreErrorKind::Closed`].
pub struct NpcStore {
    config: Arc<EffectiveConfig>,
    engine: Arc<dyn EngineBoundary>,
    personalities: Vec<Personality>,
    ids: NpcIdSource,
    population: Mutex<Population>,
    engine_order: Mutex<()>,
}

impl std::fmt::Debug for NpcStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NpcStore")
            .field("personalities", &self.personalities)
            .field("len", &self.len())
            .finish()
    }
}

impl NpcStore {
    /// Create an empty store with its own id counter. Ids start at 1.
    pub fn new(config: Arc<EffectiveConfig>, engine: Arc<dyn EngineBoundary>) -> Self {
        Self::with_id_source(config, engine, NpcIdSource::new())
    }

    /// Create an empty store drawing ids from `ids`, which may outlive it.
    pub fn with_id_source(
        config: Arc<EffectiveConfig>,
        engine: Arc<dyn EngineBoundary>,
        ids: NpcIdSource,
    ) -> Self {
        let personalities = config.personality_pool();
        Self {
            config,
            engine,
            personalities,
            ids,
            population: Mutex::new(Population::default()),
            engine_order: Mutex::new(()),
        }
    }

    /// Create, spawn and greet an NPC for `player_id`.
    ///
    /// # Errors
    ///
    /// Returns a capacity error when the global or per-player cap is reached,
    /// or [`StoreErrorKind::Closed`] after [`despawn_all`](Self::despawn_all);
    /// nothing is spawned in either case.
    pub fn create_npc(&self, player_id: &PlayerId, player_name: &str) -> StoreResult<NpcId> {
        self.create_npc_near(player_id, player_name, None)
    }

    /// Like [`create_npc`](Self::create_npc), placing the NPC around `origin`
    /// when the caller already knows where the player stands.
    ///
    /// # Errors
    ///
    /// Same as [`create_npc`](Self::create_npc).
    #[instrument(skip(self), fields(player = %player_id))]
    pub fn create_npc_near(
        &self,
        player_id: &PlayerId,
        player_name: &str,
        origin: Option<Position>,
    ) -> StoreResult<NpcId> {
        let origin = origin
            .or_else(|| self.engine.player_position(player_id))
            .unwrap_or_default();

        let _order = self.engine_order.lock();
        let record = {
            let mut population = self.population.lock();

            if population.closed {
                debug!("Store closed; not spawning");
                return Err(StoreError::new(StoreErrorKind::Closed));
            }

            let max_total = *self.config.max_npc_count();
            if population.npcs.len() >= max_total {
                warn!(cap = max_total, "Global NPC cap reached");
                return Err(StoreError::new(StoreErrorKind::GlobalCapReached(max_total)));
            }

            let per_player = *self.config.per_player_npc_cap();
            let owned = population.by_player.get(player_id).map_or(0, Vec::len);
            if owned >= per_player {
                warn!(cap = per_player, owned, "Per-player NPC cap reached");
                return Err(StoreError::new(StoreErrorKind::PlayerCapReached {
                    player: player_id.to_string(),
                    cap: per_player,
                }));
            }

            let id = self.ids.next_id();

            let mut rng = rand::thread_rng();
            let personality = self
                .personalities
                .choose(&mut rng)
                .cloned()
                .unwrap_or_else(|| Personality::new("friendly"));
            let position = spawn_offset(&mut rng, origin, *self.config.spawn_radius());

            let record = NpcRecord::new(
                id,
                player_id.clone(),
                player_name,
                personality,
                position,
            );
            population.npcs.insert(id, record.clone());
            population
                .by_player
                .entry(player_id.clone())
                .or_default()
                .push(id);
            record
        };

        info!(
            npc = %record.id(),
            personality = %record.personality(),
            name = %record.display_name(),
            "Spawning NPC"
        );
        self.engine.spawn_entity(
            *record.id(),
            record.display_name(),
            *record.position(),
            NPC_ENTITY_TAG,
        );
        self.engine
            .emit_speech(*record.id(), &record.personality().greeting(player_name));

        Ok(*record.id())
    }

    /// Remove and despawn every NPC owned by `player_id`. Safe to call twice.
    #[instrument(skip(self), fields(player = %player_id))]
    pub fn remove_npcs_for_player(&self, player_id: &PlayerId) -> Vec<NpcId> {
        let _order = self.engine_order.lock();
        let removed = {
            let mut population = self.population.lock();
            let ids = population.by_player.remove(player_id).unwrap_or_default();
            for id in &ids {
                population.npcs.remove(id);
            }
            ids
        };

        for id in &removed {
            self.engine.despawn_entity(*id);
        }
        if !removed.is_empty() {
            info!(count = removed.len(), "Removed player's NPCs");
        }
        removed
    }

    /// Despawn and forget every NPC, then refuse further creations.
    /// Returns how many were removed.
    #[instrument(skip(self))]
    pub fn despawn_all(&self) -> usize {
        let _order = self.engine_order.lock();
        let ids: Vec<NpcId> = {
            let mut population = self.population.lock();
            population.closed = true;
            population.by_player.clear();
            population.npcs.drain().map(|(id, _)| id).collect()
        };

        for id in &ids {
            self.engine.despawn_entity(*id);
        }
        debug!(count = ids.len(), "Despawned all NPCs");
        ids.len()
    }

    /// Append a finished exchange, keeping at most `limit` turns.
    ///
    /// Returns `false` when the NPC no longer exists.
    pub fn append_turn(&self, npc_id: NpcId, turn: ChatTurn, limit: usize) -> bool {
        match self.population.lock().npcs.get_mut(&npc_id) {
            Some(record) => {
                record.push_turn(turn, limit);
                true
            }
            None => false,
        }
    }

    /// Whether `npc_id` is tracked.
    pub fn contains(&self, npc_id: NpcId) -> bool {
        self.population.lock().npcs.contains_key(&npc_id)
    }

    /// Snapshot of one NPC.
    pub fn get(&self, npc_id: NpcId) -> Option<NpcRecord> {
        self.population.lock().npcs.get(&npc_id).cloned()
    }

    /// Provider context for one NPC.
    pub fn context(&self, npc_id: NpcId) -> Option<NpcContext> {
        self.population.lock().npcs.get(&npc_id).map(NpcRecord::context)
    }

    /// Provider context and conversation, read under one lock.
    pub fn conversation(&self, npc_id: NpcId) -> Option<(NpcContext, Vec<ChatTurn>)> {
        self.population
            .lock()
            .npcs
            .get(&npc_id)
            .map(|record| (record.context(), record.history().iter().cloned().collect()))
    }

    /// Whether [`despawn_all`](Self::despawn_all) has run.
    pub fn is_closed(&self) -> bool {
        self.population.lock().closed
    }

    /// Copy of one NPC's conversation, oldest first.
    pub fn history(&self, npc_id: NpcId) -> Option<VecDeque<ChatTurn>> {
        self.population
            .lock()
            .npcs
            .get(&npc_id)
            .map(|record| record.history().clone())
    }

    /// NPCs owned by `player_id`, in creation order.
    pub fn npcs_for_player(&self, player_id: &PlayerId) -> Vec<NpcId> {
        self.population
            .lock()
            .by_player
            .get(player_id)
            .cloned()
            .unwrap_or_default()
    }

    /// All tracked NPC ids, ascending.
    pub fn ids(&self) -> Vec<NpcId> {
        let mut ids: Vec<NpcId> = self.population.lock().npcs.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Number of tracked NPCs.
    pub fn len(&self) -> usize {
        self.population.lock().npcs.len()
    }

    /// Whether no NPCs are tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
