//! Bevy systems and the per-network plugin.
//!
//! ```text
//! PreSim      advance tick, lifecycle (removed sweep, deconstructed, constructed)
//! Simulation  refresh producer output -> run_network_tick
//! PostSim     publish buffered events
//! ```

use std::collections::BTreeMap;
use std::marker::PhantomData;

use bevy::prelude::*;

use crate::components::{Conduit, Consumer, Producer, StorageTank};
use crate::config::UtilityParams;
use crate::events::UtilityEvent;
use crate::network::NetworkState;
use crate::network_kind::NetworkKind;
use crate::player::PlayerId;
use crate::pool::{ConsumerSlot, ProducerSample};
use crate::simulation_sets::SimulationSet;
use crate::topology::NodeRole;
use crate::TickCounter;

// ---------------------------------------------------------------------------
// Lifecycle events
// ---------------------------------------------------------------------------

/// Sent by the building pipeline after it spawned a facility carrying
/// producer/conduit/consumer components.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureConstructed {
    pub entity: Entity,
}

/// Sent by the building pipeline when a facility is torn down.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureDeconstructed {
    pub entity: Entity,
}

/// Register the network roles of newly constructed structures.
pub fn register_constructed<K: NetworkKind>(
    mut constructed: EventReader<StructureConstructed>,
    mut state: ResMut<NetworkState<K>>,
    producers: Query<&Producer<K>>,
    conduits: Query<&Conduit<K>>,
    consumers: Query<&Consumer<K>>,
) {
    for event in constructed.read() {
        let entity = event.entity;
        if state.topology().contains(entity) {
            continue;
        }
        let producer = producers.get(entity).ok();
        let conduit = conduits.get(entity).ok();
        let consumer = consumers.get(entity).ok();
        let roles = [producer.is_some(), conduit.is_some(), consumer.is_some()]
            .into_iter()
            .filter(|present| *present)
            .count();
        if roles > 1 {
            // The topology keys nodes by entity; only one role is registered.
            warn!(
                "{} network: entity {:?} carries {} roles, registering only the first",
                K::LABEL.name(),
                entity,
                roles
            );
        }
        let result = if let Some(producer) = producer {
            state.register_producer(entity, producer)
        } else if let Some(conduit) = conduit {
            state.register_conduit(entity, conduit)
        } else if let Some(consumer) = consumer {
            state.register_consumer(entity, consumer)
        } else {
            continue;
        };
        if let Err(err) = result {
            warn!(
                "{} network: rejected constructed entity {:?}: {}",
                K::LABEL.name(),
                entity,
                err
            );
        }
    }
}

pub fn unregister_deconstructed<K: NetworkKind>(
    mut deconstructed: EventReader<StructureDeconstructed>,
    mut state: ResMut<NetworkState<K>>,
) {
    for event in deconstructed.read() {
        state.unregister(event.entity);
    }
}

/// Backstop for entities despawned (or stripped of their role) without a
/// deconstruction event.
pub fn sweep_removed<K: NetworkKind>(
    mut removed_producers: RemovedComponents<Producer<K>>,
    mut removed_conduits: RemovedComponents<Conduit<K>>,
    mut removed_consumers: RemovedComponents<Consumer<K>>,
    mut state: ResMut<NetworkState<K>>,
) {
    let mut sweep = |entity: Entity, role: NodeRole| {
        if state.topology().role_of(entity) == Some(role) {
            state.unregister(entity);
        }
    };
    for entity in removed_producers.read() {
        sweep(entity, NodeRole::Producer);
    }
    for entity in removed_conduits.read() {
        sweep(entity, NodeRole::Conduit);
    }
    for entity in removed_consumers.read() {
        sweep(entity, NodeRole::Consumer);
    }
}

// ---------------------------------------------------------------------------
// Tick
// ---------------------------------------------------------------------------

pub fn refresh_producer_output<K: NetworkKind>(mut producers: Query<&mut Producer<K>>) {
    for mut producer in &mut producers {
        producer.refresh_output();
    }
}

/// Run the full pipeline for every player, ascending, then write the results
/// back onto the components.
pub fn run_network_tick<K: NetworkKind>(
    tick: Res<TickCounter>,
    params: Res<UtilityParams>,
    mut state: ResMut<NetworkState<K>>,
    producers: Query<(Entity, &Producer<K>, Option<&StorageTank>)>,
    mut consumers: Query<(Entity, &mut Consumer<K>)>,
    mut conduits: Query<(Entity, &mut Conduit<K>)>,
) {
    state.begin_tick(tick.0);

    let mut producer_samples: BTreeMap<PlayerId, Vec<ProducerSample>> = BTreeMap::new();
    for (entity, producer, tank) in &producers {
        state.sync_producer_online(entity, producer.online);
        let Some((NodeRole::Producer, _, owner)) = state.topology().locate(entity) else {
            continue;
        };
        producer_samples.entry(owner).or_default().push(ProducerSample {
            entity,
            owner,
            output: producer.current_output,
            online: producer.online,
            storage: tank.map_or(0.0, |t| t.capacity),
        });
    }

    let mut consumer_slots: BTreeMap<PlayerId, Vec<ConsumerSlot>> = BTreeMap::new();
    for (entity, consumer) in &consumers {
        let Some((NodeRole::Consumer, pos, owner)) = state.topology().locate(entity) else {
            continue;
        };
        consumer_slots.entry(owner).or_default().push(ConsumerSlot::new(
            entity,
            owner,
            pos,
            consumer.required,
            consumer.priority,
        ));
    }

    let mut grants: BTreeMap<Entity, (f32, bool)> = BTreeMap::new();
    for player in PlayerId::all(state.max_players()) {
        let mut samples = producer_samples.remove(&player).unwrap_or_default();
        samples.sort_by_key(|s| s.entity);
        let mut slots = consumer_slots.remove(&player).unwrap_or_default();
        slots.sort_by_key(|s| s.entity);

        state.process_player(player, &samples, &mut slots, &params);
        grants.extend(slots.iter().map(|s| (s.entity, (s.received, s.satisfied))));
    }

    for (entity, mut consumer) in &mut consumers {
        let (received, satisfied) = grants.get(&entity).copied().unwrap_or((0.0, false));
        if consumer.received != received || consumer.satisfied != satisfied {
            consumer.received = received;
            consumer.satisfied = satisfied;
        }
    }

    for (entity, mut conduit) in &mut conduits {
        let connected = state.conduit_connected(entity);
        let owner = state
            .topology()
            .locate(entity)
            .map_or(conduit.owner, |(_, _, owner)| owner);
        let active = connected && state.pool(owner).total_generated > 0.0;
        if conduit.is_connected != connected || conduit.is_active != active {
            conduit.is_connected = connected;
            conduit.is_active = active;
        }
    }
}

/// Forward this tick's buffered events as bevy events.
pub fn publish_events<K: NetworkKind>(state: Res<NetworkState<K>>, mut writer: EventWriter<UtilityEvent>) {
    for event in state.events() {
        writer.send(*event);
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Registers one utility network. Expects `TickCounter`, `UtilityParams` and
/// the lifecycle events to exist; [`crate::UtilityGridPlugin`] adds them and
/// schedules [`publish_events`] for every network in a fixed order.
pub struct UtilityNetworkPlugin<K: NetworkKind>(PhantomData<K>);

impl<K: NetworkKind> Default for UtilityNetworkPlugin<K> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<K: NetworkKind> Plugin for UtilityNetworkPlugin<K> {
    fn build(&self, app: &mut App) {
        app.init_resource::<NetworkState<K>>();

        app.add_systems(
            FixedUpdate,
            (
                sweep_removed::<K>,
                unregister_deconstructed::<K>,
                register_constructed::<K>,
            )
                .chain()
                .after(crate::advance_tick)
                .in_set(SimulationSet::PreSim),
        )
        .add_systems(
            FixedUpdate,
            (refresh_producer_output::<K>, run_network_tick::<K>)
                .chain()
                .in_set(SimulationSet::Simulation),
        );
    }
}
