//! Read helpers for `TestGrid`.

use bevy::prelude::*;

use crate::components::{Conduit, Consumer};
use crate::events::UtilityEvent;
use crate::network::NetworkState;
use crate::network_kind::{Energy, Fluid, NetworkKind};
use crate::parity;
use crate::player::PlayerId;
use crate::pool::PoolSnapshot;

use super::TestGrid;

impl TestGrid {
    pub fn energy(&self) -> &NetworkState<Energy> {
        self.resource::<NetworkState<Energy>>()
    }

    pub fn fluid(&self) -> &NetworkState<Fluid> {
        self.resource::<NetworkState<Fluid>>()
    }

    pub fn pool(&self, owner: u8) -> PoolSnapshot {
        self.energy().pool(PlayerId(owner))
    }

    pub fn consumer(&self, entity: Entity) -> &Consumer<Energy> {
        self.world().get::<Consumer<Energy>>(entity).unwrap()
    }

    pub fn water_consumer(&self, entity: Entity) -> &Consumer<Fluid> {
        self.world().get::<Consumer<Fluid>>(entity).unwrap()
    }

    pub fn conduit(&self, entity: Entity) -> &Conduit<Energy> {
        self.world().get::<Conduit<Energy>>(entity).unwrap()
    }

    pub fn is_satisfied(&self, entity: Entity) -> bool {
        self.consumer(entity).satisfied
    }

    /// Take every `UtilityEvent` published since the last drain.
    pub fn drain_events(&mut self) -> Vec<UtilityEvent> {
        self.world_mut()
            .resource_mut::<Events<UtilityEvent>>()
            .drain()
            .collect()
    }

    pub fn checksum<K: NetworkKind>(&self) -> u32 {
        parity::network_checksum(self.resource::<NetworkState<K>>())
    }
}
