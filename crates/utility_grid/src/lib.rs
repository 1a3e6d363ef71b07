//! Deterministic, multi-player utility networks (energy and a simplified
//! fluid variant) for a tile-based city simulation.
//!
//! Producers seed coverage, conduits relay it, and consumers inside their
//! owner's coverage draw from a per-player pool that is classified and
//! distributed once per fixed tick.

pub mod capabilities;
pub mod components;
pub mod config;
pub mod coverage;
pub mod dirty;
pub mod distribution;
pub mod events;
pub mod network;
pub mod network_kind;
pub mod parity;
pub mod placement;
pub mod player;
pub mod pool;
pub mod queries;
pub mod records;
pub mod simulation_sets;
pub mod systems;
pub mod topology;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
pub mod test_harness;

use bevy::prelude::*;

pub use capabilities::{Terrain, TerrainMask, TerrainProvider};
pub use components::{Conduit, Consumer, LoadPriority, Producer, StorageTank};
pub use config::UtilityParams;
pub use events::{UtilityEvent, UtilityEventKind};
pub use network::NetworkState;
pub use network_kind::{Energy, Fluid, FluidSource, NetworkKind, NetworkLabel, PowerSource};
pub use placement::PlacementError;
pub use player::PlayerId;
pub use pool::{PoolSnapshot, PoolState};
pub use queries::UtilityQuery;
pub use simulation_sets::SimulationSet;
pub use systems::{StructureConstructed, StructureDeconstructed, UtilityNetworkPlugin};

/// Fixed-tick counter stamped onto every event.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickCounter(pub u64);

pub fn advance_tick(mut tick: ResMut<TickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

/// Both utility networks plus the shared resources, events and phase order.
pub struct UtilityGridPlugin;

impl Plugin for UtilityGridPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::PreSim,
                SimulationSet::Simulation,
                SimulationSet::PostSim,
            )
                .chain(),
        );

        app.init_resource::<TickCounter>()
            .init_resource::<UtilityParams>()
            .init_resource::<Terrain>()
            .add_event::<UtilityEvent>()
            .add_event::<StructureConstructed>()
            .add_event::<StructureDeconstructed>()
            .add_systems(FixedUpdate, advance_tick.in_set(SimulationSet::PreSim));

        app.add_plugins((
            UtilityNetworkPlugin::<Energy>::default(),
            UtilityNetworkPlugin::<Fluid>::default(),
        ));

        // Energy events always precede fluid events within a tick.
        app.add_systems(
            FixedUpdate,
            (
                systems::publish_events::<Energy>,
                systems::publish_events::<Fluid>,
            )
                .chain()
                .in_set(SimulationSet::PostSim),
        );
    }
}
