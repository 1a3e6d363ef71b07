//! Sparse network topology: which producer/conduit/consumer sits on which
//! tile, plus per-player position sets so a flood fill only touches its own
//! player's structures.
//!
//! Every map is ordered (`BTreeMap`/`BTreeSet`) so enumeration never depends
//! on insertion history or hashing.

use std::collections::{BTreeMap, BTreeSet};

use bevy::prelude::*;

use crate::placement::PlacementError;
use crate::player::PlayerId;

/// Tile coordinate `(x, y)`.
pub type GridPos = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Producer,
    Conduit,
    Consumer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerNode {
    pub entity: Entity,
    pub owner: PlayerId,
    pub radius: u32,
    /// Last online flag seen; a change marks the owner dirty.
    pub online: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConduitNode {
    pub entity: Entity,
    pub owner: PlayerId,
    pub radius: u32,
    /// Result of the most recent flood fill for `owner`.
    pub connected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerNode {
    pub entity: Entity,
    pub owner: PlayerId,
}

/// Removal result handed back to the caller so it can dirty the right player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovedNode {
    pub role: NodeRole,
    pub pos: GridPos,
    pub owner: PlayerId,
}

#[derive(Debug, Clone, Default)]
struct PlayerPositions {
    producers: BTreeSet<GridPos>,
    conduits: BTreeSet<GridPos>,
    consumers: BTreeSet<GridPos>,
}

#[derive(Debug, Clone)]
pub struct TopologyStore {
    producers: BTreeMap<GridPos, ProducerNode>,
    conduits: BTreeMap<GridPos, ConduitNode>,
    consumers: BTreeMap<GridPos, ConsumerNode>,
    index: BTreeMap<Entity, (NodeRole, GridPos)>,
    /// Indexed by player id; slot 0 is never used.
    players: Vec<PlayerPositions>,
}

impl TopologyStore {
    pub fn new(max_players: u8) -> Self {
        Self {
            producers: BTreeMap::new(),
            conduits: BTreeMap::new(),
            consumers: BTreeMap::new(),
            index: BTreeMap::new(),
            players: vec![PlayerPositions::default(); max_players as usize + 1],
        }
    }

    fn max_players(&self) -> u8 {
        (self.players.len() - 1) as u8
    }

    pub fn is_occupied(&self, pos: GridPos) -> bool {
        self.producers.contains_key(&pos)
            || self.conduits.contains_key(&pos)
            || self.consumers.contains_key(&pos)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.index.contains_key(&entity)
    }

    pub fn role_of(&self, entity: Entity) -> Option<NodeRole> {
        self.index.get(&entity).map(|(role, _)| *role)
    }

    /// Registered role, tile and owner of `entity`.
    pub fn locate(&self, entity: Entity) -> Option<(NodeRole, GridPos, PlayerId)> {
        let (role, pos) = *self.index.get(&entity)?;
        let owner = match role {
            NodeRole::Producer => self.producers.get(&pos)?.owner,
            NodeRole::Conduit => self.conduits.get(&pos)?.owner,
            NodeRole::Consumer => self.consumers.get(&pos)?.owner,
        };
        Some((role, pos, owner))
    }

    fn check_insert(&self, entity: Entity, owner: PlayerId, pos: GridPos) -> Result<(), PlacementError> {
        if !owner.is_valid(self.max_players()) {
            return Err(PlacementError::InvalidPlayer(owner.0));
        }
        if self.index.contains_key(&entity) {
            return Err(PlacementError::AlreadyRegistered);
        }
        if self.is_occupied(pos) {
            return Err(PlacementError::Occupied);
        }
        Ok(())
    }

    pub fn insert_producer(&mut self, pos: GridPos, node: ProducerNode) -> Result<(), PlacementError> {
        self.check_insert(node.entity, node.owner, pos)?;
        self.producers.insert(pos, node);
        self.index.insert(node.entity, (NodeRole::Producer, pos));
        self.players[node.owner.index()].producers.insert(pos);
        Ok(())
    }

    pub fn insert_conduit(&mut self, pos: GridPos, node: ConduitNode) -> Result<(), PlacementError> {
        self.check_insert(node.entity, node.owner, pos)?;
        self.conduits.insert(pos, node);
        self.index.insert(node.entity, (NodeRole::Conduit, pos));
        self.players[node.owner.index()].conduits.insert(pos);
        Ok(())
    }

    pub fn insert_consumer(&mut self, pos: GridPos, node: ConsumerNode) -> Result<(), PlacementError> {
        self.check_insert(node.entity, node.owner, pos)?;
        self.consumers.insert(pos, node);
        self.index.insert(node.entity, (NodeRole::Consumer, pos));
        self.players[node.owner.index()].consumers.insert(pos);
        Ok(())
    }

    /// Unregister an entity. Returns `None` when it was never registered.
    pub fn remove(&mut self, entity: Entity) -> Option<RemovedNode> {
        let (role, pos) = self.index.remove(&entity)?;
        let owner = match role {
            NodeRole::Producer => self.producers.remove(&pos).map(|n| n.owner),
            NodeRole::Conduit => self.conduits.remove(&pos).map(|n| n.owner),
            NodeRole::Consumer => self.consumers.remove(&pos).map(|n| n.owner),
        }?;
        let sets = &mut self.players[owner.index()];
        match role {
            NodeRole::Producer => sets.producers.remove(&pos),
            NodeRole::Conduit => sets.conduits.remove(&pos),
            NodeRole::Consumer => sets.consumers.remove(&pos),
        };
        Some(RemovedNode { role, pos, owner })
    }

    /// Record a producer's online flag. Returns the owner when the flag changed.
    pub fn sync_producer_online(&mut self, entity: Entity, online: bool) -> Option<PlayerId> {
        let (role, pos) = self.index.get(&entity)?;
        if *role != NodeRole::Producer {
            return None;
        }
        let node = self.producers.get_mut(pos)?;
        if node.online == online {
            return None;
        }
        node.online = online;
        Some(node.owner)
    }

    /// Online producers of `player` as `(position, radius)`, ordered by position.
    pub fn online_producers(&self, player: PlayerId) -> Vec<(GridPos, u32)> {
        let Some(sets) = self.players.get(player.index()) else {
            return Vec::new();
        };
        sets.producers
            .iter()
            .filter_map(|pos| {
                let node = self.producers.get(pos)?;
                node.online.then_some((*pos, node.radius))
            })
            .collect()
    }

    pub fn conduit_at(&self, pos: GridPos) -> Option<&ConduitNode> {
        self.conduits.get(&pos)
    }

    pub(crate) fn conduit_at_mut(&mut self, pos: GridPos) -> Option<&mut ConduitNode> {
        self.conduits.get_mut(&pos)
    }

    pub fn conduit_of(&self, entity: Entity) -> Option<&ConduitNode> {
        match self.index.get(&entity)? {
            (NodeRole::Conduit, pos) => self.conduits.get(pos),
            _ => None,
        }
    }

    /// Mark every conduit of `player` as not connected.
    pub fn reset_connected(&mut self, player: PlayerId) {
        let Some(sets) = self.players.get(player.index()) else {
            return;
        };
        for pos in &sets.conduits {
            if let Some(node) = self.conduits.get_mut(pos) {
                node.connected = false;
            }
        }
    }

    pub fn connected_count(&self, player: PlayerId) -> usize {
        self.players
            .get(player.index())
            .map(|sets| {
                sets.conduits
                    .iter()
                    .filter(|pos| self.conduits.get(pos).is_some_and(|n| n.connected))
                    .count()
            })
            .unwrap_or(0)
    }

    pub fn producer_count(&self, player: PlayerId) -> usize {
        self.players.get(player.index()).map_or(0, |s| s.producers.len())
    }

    pub fn conduit_count(&self, player: PlayerId) -> usize {
        self.players.get(player.index()).map_or(0, |s| s.conduits.len())
    }

    pub fn consumer_count(&self, player: PlayerId) -> usize {
        self.players.get(player.index()).map_or(0, |s| s.consumers.len())
    }
}
