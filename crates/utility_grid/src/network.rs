//! `NetworkState<K>`: the per-network resource that owns every piece of
//! coverage, topology, pool and event state for one utility network.
//!
//! Nothing here is global. Systems reach it through `Res`/`ResMut`, and
//! collaborators read it through the accessors below or through
//! [`crate::queries::UtilityQuery`].

use std::collections::BTreeMap;
use std::marker::PhantomData;

use bevy::prelude::*;

use crate::components::{Conduit, Consumer, Producer};
use crate::config::{UtilityParams, GRID_HEIGHT, GRID_WIDTH, MAX_PLAYERS};
use crate::coverage::{rebuild_coverage, CoverageGrid};
use crate::dirty::DirtyFlags;
use crate::distribution::{distribute, DistributionStrategy, SupplyFrame};
use crate::events::{consumer_transition, pool_transition_events, UtilityEvent, UtilityEventKind};
use crate::network_kind::NetworkKind;
use crate::placement::PlacementError;
use crate::player::PlayerId;
use crate::pool::{aggregate, ConsumerSlot, PoolSnapshot, ProducerSample};
use crate::topology::{ConduitNode, ConsumerNode, NodeRole, ProducerNode, RemovedNode, TopologyStore};

#[derive(Resource)]
pub struct NetworkState<K: NetworkKind> {
    grid: CoverageGrid,
    topology: TopologyStore,
    dirty: DirtyFlags,
    /// Indexed by player id; slot 0 is never used.
    pools: Vec<PoolSnapshot>,
    events: Vec<Vec<UtilityEvent>>,
    /// Last tick's satisfied flag per registered consumer.
    satisfied: BTreeMap<Entity, bool>,
    strategy: K::Strategy,
    max_players: u8,
    last_tick: u64,
    _network: PhantomData<K>,
}

impl<K: NetworkKind> Default for NetworkState<K> {
    fn default() -> Self {
        Self::new(GRID_WIDTH, GRID_HEIGHT, MAX_PLAYERS)
    }
}

impl<K: NetworkKind> NetworkState<K> {
    pub fn new(width: usize, height: usize, max_players: u8) -> Self {
        let slots = max_players as usize + 1;
        Self {
            grid: CoverageGrid::new(width, height),
            topology: TopologyStore::new(max_players),
            dirty: DirtyFlags::new(max_players),
            pools: vec![PoolSnapshot::default(); slots],
            events: vec![Vec::new(); slots],
            satisfied: BTreeMap::new(),
            strategy: K::Strategy::default(),
            max_players,
            last_tick: 0,
            _network: PhantomData,
        }
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    pub fn grid(&self) -> &CoverageGrid {
        &self.grid
    }

    pub fn topology(&self) -> &TopologyStore {
        &self.topology
    }

    pub fn strategy(&self) -> &K::Strategy {
        &self.strategy
    }

    pub fn max_players(&self) -> u8 {
        self.max_players
    }

    /// Tick number of the last completed pipeline run.
    pub fn last_tick(&self) -> u64 {
        self.last_tick
    }

    /// Pool snapshot from the last completed tick. Invalid players get an
    /// empty Healthy pool.
    pub fn pool(&self, player: PlayerId) -> PoolSnapshot {
        if !player.is_valid(self.max_players) {
            return PoolSnapshot::default();
        }
        self.pools[player.index()]
    }

    pub fn covered_by(&self, x: usize, y: usize, player: PlayerId) -> bool {
        player.is_valid(self.max_players) && self.grid.covered_by(x, y, player)
    }

    pub fn events_for(&self, player: PlayerId) -> &[UtilityEvent] {
        if !player.is_valid(self.max_players) {
            return &[];
        }
        &self.events[player.index()]
    }

    /// Every buffered event, players ascending.
    pub fn events(&self) -> impl Iterator<Item = &UtilityEvent> {
        self.events.iter().flatten()
    }

    pub fn is_dirty(&self, player: PlayerId) -> bool {
        self.dirty.is_dirty(player)
    }

    /// Whether `entity` is a registered conduit reached by its owner's last
    /// flood fill.
    pub fn conduit_connected(&self, entity: Entity) -> bool {
        self.topology.conduit_of(entity).is_some_and(|n| n.connected)
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    fn check_bounds(&self, x: usize, y: usize) -> Result<(), PlacementError> {
        if self.grid.in_bounds(x, y) {
            Ok(())
        } else {
            Err(PlacementError::OutOfBounds)
        }
    }

    pub fn register_producer(&mut self, entity: Entity, producer: &Producer<K>) -> Result<(), PlacementError> {
        self.check_bounds(producer.grid_x, producer.grid_y)?;
        self.topology.insert_producer(
            (producer.grid_x, producer.grid_y),
            ProducerNode {
                entity,
                owner: producer.owner,
                radius: producer.coverage_radius,
                online: producer.online,
            },
        )?;
        self.dirty.mark(producer.owner);
        Ok(())
    }

    pub fn register_conduit(&mut self, entity: Entity, conduit: &Conduit<K>) -> Result<(), PlacementError> {
        self.check_bounds(conduit.grid_x, conduit.grid_y)?;
        self.topology.insert_conduit(
            (conduit.grid_x, conduit.grid_y),
            ConduitNode {
                entity,
                owner: conduit.owner,
                radius: conduit.coverage_radius,
                connected: false,
            },
        )?;
        self.dirty.mark(conduit.owner);
        Ok(())
    }

    /// Consumers never dirty coverage; they only read it.
    pub fn register_consumer(&mut self, entity: Entity, consumer: &Consumer<K>) -> Result<(), PlacementError> {
        self.check_bounds(consumer.grid_x, consumer.grid_y)?;
        self.topology.insert_consumer(
            (consumer.grid_x, consumer.grid_y),
            ConsumerNode {
                entity,
                owner: consumer.owner,
            },
        )?;
        self.satisfied.insert(entity, false);
        Ok(())
    }

    /// Unregister `entity`. Producer and conduit removals dirty their owner.
    pub fn unregister(&mut self, entity: Entity) -> Option<RemovedNode> {
        let removed = self.topology.remove(entity)?;
        match removed.role {
            NodeRole::Producer | NodeRole::Conduit => self.dirty.mark(removed.owner),
            NodeRole::Consumer => {
                self.satisfied.remove(&entity);
            }
        }
        Some(removed)
    }

    /// Push a producer's current online flag into the topology. Returns true
    /// when it changed (and the owner was marked dirty).
    pub fn sync_producer_online(&mut self, entity: Entity, online: bool) -> bool {
        match self.topology.sync_producer_online(entity, online) {
            Some(owner) => {
                self.dirty.mark(owner);
                true
            }
            None => false,
        }
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty.mark_all();
    }

    /// Seed a consumer's cached satisfied flag, e.g. from a loaded component.
    pub fn seed_satisfied(&mut self, entity: Entity, satisfied: bool) {
        if self.topology.role_of(entity) == Some(NodeRole::Consumer) {
            self.satisfied.insert(entity, satisfied);
        }
    }

    /// Put back a persisted pool so the next tick's transition detection
    /// compares against the saved state.
    pub fn restore_pool(&mut self, player: PlayerId, pool: PoolSnapshot) {
        if player.is_valid(self.max_players) {
            self.pools[player.index()] = pool;
        }
    }

    /// Drop all derived and registered state, keeping grid shape, player
    /// count and the tick counter.
    pub fn reset(&mut self) {
        let slots = self.max_players as usize + 1;
        self.grid = CoverageGrid::new(self.grid.width(), self.grid.height());
        self.topology = TopologyStore::new(self.max_players);
        self.dirty = DirtyFlags::new(self.max_players);
        self.pools = vec![PoolSnapshot::default(); slots];
        self.events = vec![Vec::new(); slots];
        self.satisfied.clear();
        self.strategy.reset();
    }

    // -----------------------------------------------------------------------
    // Tick pipeline
    // -----------------------------------------------------------------------

    /// Clear last tick's event buffers.
    pub fn begin_tick(&mut self, tick: u64) {
        self.last_tick = tick;
        self.events.iter_mut().for_each(Vec::clear);
    }

    /// Run coverage, aggregation, classification, distribution and event
    /// emission for one player. `producers` and `slots` hold this player's
    /// samples; `slots` receive the grants.
    pub fn process_player(
        &mut self,
        player: PlayerId,
        producers: &[ProducerSample],
        slots: &mut [ConsumerSlot],
        params: &UtilityParams,
    ) -> PoolSnapshot {
        if !player.is_valid(self.max_players) {
            return PoolSnapshot::default();
        }
        let idx = player.index();

        if self.dirty.is_dirty(player) {
            let outcome = rebuild_coverage(&mut self.grid, &mut self.topology, player);
            self.dirty.finish_rebuild(player, &outcome);
        }

        let frame = SupplyFrame {
            player,
            producers,
            params,
        };
        let previous = self.pools[idx].state;
        let mut pool = aggregate(player, producers, slots, &self.grid);
        let released = self.strategy.release(&frame, &pool);
        if released > 0.0 {
            pool.add_supply(released);
        }
        pool.classify(previous, params);

        if pool.transitioned() {
            info!(
                "{} pool for player {}: {} -> {} (generated {:.1}, consumed {:.1})",
                K::LABEL.name(),
                player.0,
                previous.name(),
                pool.state.name(),
                pool.total_generated,
                pool.total_consumed
            );
        }
        for kind in pool_transition_events(previous, pool.state) {
            self.push_event(player, kind);
        }

        distribute(&mut self.strategy, &frame, &pool, &self.grid, slots);

        let mut owned: Vec<&ConsumerSlot> = slots.iter().filter(|s| s.owner == player).collect();
        owned.sort_by_key(|s| s.entity);
        for slot in owned {
            let was = self
                .satisfied
                .insert(slot.entity, slot.satisfied)
                .unwrap_or(false);
            if let Some(kind) = consumer_transition(slot.entity, was, slot.satisfied) {
                self.push_event(player, kind);
            }
        }

        self.strategy.settle(&frame, &pool);
        self.pools[idx] = pool;
        pool
    }

    fn push_event(&mut self, player: PlayerId, kind: UtilityEventKind) {
        self.events[player.index()].push(UtilityEvent {
            network: K::LABEL,
            tick: self.last_tick,
            player,
            kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::LoadPriority;
    use crate::network_kind::{Energy, PowerSource};
    use crate::pool::PoolState;

    const P1: PlayerId = PlayerId(1);

    fn sample(entity: Entity, output: f32) -> ProducerSample {
        ProducerSample {
            entity,
            owner: P1,
            output,
            online: true,
            storage: 0.0,
        }
    }

    #[test]
    fn test_registration_marks_owner_dirty() {
        let mut state = NetworkState::<Energy>::new(32, 32, 4);
        let plant = Producer::<Energy>::new(PowerSource::Gas, P1, 4, 4, 100.0, 3);
        state.register_producer(Entity::from_raw(1), &plant).unwrap();
        assert!(state.is_dirty(P1));
        assert!(!state.is_dirty(PlayerId(2)));
    }

    #[test]
    fn test_consumer_registration_does_not_dirty() {
        let mut state = NetworkState::<Energy>::new(32, 32, 4);
        let house = Consumer::<Energy>::new(P1, 4, 4, 10.0, LoadPriority::Normal);
        state.register_consumer(Entity::from_raw(1), &house).unwrap();
        assert!(!state.is_dirty(P1));
    }

    #[test]
    fn test_out_of_bounds_registration_rejected() {
        let mut state = NetworkState::<Energy>::new(16, 16, 4);
        let conduit = Conduit::<Energy>::new(P1, 16, 0, 2);
        let err = state.register_conduit(Entity::from_raw(1), &conduit).unwrap_err();
        assert_eq!(err, PlacementError::OutOfBounds);
    }

    #[test]
    fn test_process_player_rebuilds_and_clears_dirty() {
        let mut state = NetworkState::<Energy>::new(32, 32, 4);
        let params = UtilityParams::default();
        let plant_entity = Entity::from_raw(1);
        let house_entity = Entity::from_raw(2);
        let plant = Producer::<Energy>::new(PowerSource::Solar, P1, 10, 10, 50.0, 4);
        let house = Consumer::<Energy>::new(P1, 11, 11, 20.0, LoadPriority::Normal);
        state.register_producer(plant_entity, &plant).unwrap();
        state.register_consumer(house_entity, &house).unwrap();

        state.begin_tick(1);
        let producers = [sample(plant_entity, 50.0)];
        let mut slots = [ConsumerSlot::new(house_entity, P1, (11, 11), 20.0, LoadPriority::Normal)];
        let pool = state.process_player(P1, &producers, &mut slots, &params);

        assert!(!state.is_dirty(P1));
        assert!(state.covered_by(11, 11, P1));
        assert_eq!(pool.state, PoolState::Healthy);
        assert!(slots[0].satisfied);
        assert_eq!(state.events_for(P1).len(), 1, "first satisfied flip");
    }

    #[test]
    fn test_invalid_player_queries_are_safe() {
        let state = NetworkState::<Energy>::new(8, 8, 4);
        assert_eq!(state.pool(PlayerId(0)), PoolSnapshot::default());
        assert_eq!(state.pool(PlayerId(9)), PoolSnapshot::default());
        assert!(state.events_for(PlayerId(77)).is_empty());
        assert!(!state.covered_by(0, 0, PlayerId(0)));
    }

    #[test]
    fn test_unregister_consumer_forgets_cache() {
        let mut state = NetworkState::<Energy>::new(8, 8, 4);
        let e = Entity::from_raw(3);
        let house = Consumer::<Energy>::new(P1, 1, 1, 5.0, LoadPriority::Low);
        state.register_consumer(e, &house).unwrap();
        state.seed_satisfied(e, true);
        let removed = state.unregister(e).unwrap();
        assert_eq!(removed.role, NodeRole::Consumer);
        assert!(!state.is_dirty(P1));
        assert!(state.unregister(e).is_none());
    }
}
