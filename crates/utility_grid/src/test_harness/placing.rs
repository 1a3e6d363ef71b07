//! Structure placement helpers for `TestGrid`. These unwrap: a rejected
//! placement inside a test setup is a broken test.

use bevy::prelude::*;

use crate::components::{Conduit, Consumer, LoadPriority, Producer, StorageTank};
use crate::network_kind::{Energy, Fluid, FluidSource, PowerSource};
use crate::placement::{self, PlacementError};
use crate::player::PlayerId;

use super::TestGrid;

impl TestGrid {
    // -----------------------------------------------------------------------
    // Energy
    // -----------------------------------------------------------------------

    pub fn power_plant(&mut self, owner: u8, pos: (usize, usize), output: f32, radius: u32) -> Entity {
        self.power_plant_of(PowerSource::Gas, owner, pos, output, radius)
    }

    pub fn power_plant_of(
        &mut self,
        source: PowerSource,
        owner: u8,
        pos: (usize, usize),
        output: f32,
        radius: u32,
    ) -> Entity {
        let producer = Producer::<Energy>::new(source, PlayerId(owner), pos.0, pos.1, output, radius);
        placement::place_producer(self.world_mut(), producer).unwrap()
    }

    pub fn power_line(&mut self, owner: u8, pos: (usize, usize), radius: u32) -> Entity {
        let conduit = Conduit::<Energy>::new(PlayerId(owner), pos.0, pos.1, radius);
        placement::place_conduit(self.world_mut(), conduit).unwrap()
    }

    pub fn building(&mut self, owner: u8, pos: (usize, usize), required: f32, priority: LoadPriority) -> Entity {
        let consumer = Consumer::<Energy>::new(PlayerId(owner), pos.0, pos.1, required, priority);
        placement::place_consumer(self.world_mut(), consumer).unwrap()
    }

    pub fn try_building(
        &mut self,
        owner: u8,
        pos: (usize, usize),
        required: f32,
    ) -> Result<Entity, PlacementError> {
        let consumer = Consumer::<Energy>::new(PlayerId(owner), pos.0, pos.1, required, LoadPriority::Normal);
        placement::place_consumer(self.world_mut(), consumer)
    }

    // -----------------------------------------------------------------------
    // Fluid
    // -----------------------------------------------------------------------

    /// A fluid producer, with a storage tank when `storage > 0`.
    pub fn pump(&mut self, owner: u8, pos: (usize, usize), output: f32, radius: u32, storage: f32) -> Entity {
        let producer =
            Producer::<Fluid>::new(FluidSource::PumpingStation, PlayerId(owner), pos.0, pos.1, output, radius);
        let entity = placement::place_producer(self.world_mut(), producer).unwrap();
        if storage > 0.0 {
            self.world_mut()
                .entity_mut(entity)
                .insert(StorageTank { capacity: storage });
        }
        entity
    }

    pub fn pipe(&mut self, owner: u8, pos: (usize, usize), radius: u32) -> Entity {
        let conduit = Conduit::<Fluid>::new(PlayerId(owner), pos.0, pos.1, radius);
        placement::place_conduit(self.world_mut(), conduit).unwrap()
    }

    /// Add a water demand to an existing building.
    pub fn with_water_demand(&mut self, entity: Entity, owner: u8, pos: (usize, usize), required: f32) {
        let consumer = Consumer::<Fluid>::new(PlayerId(owner), pos.0, pos.1, required, LoadPriority::Normal);
        placement::attach_consumer(self.world_mut(), entity, consumer).unwrap();
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    pub fn set_online(&mut self, entity: Entity, online: bool) {
        assert!(placement::set_producer_online::<Energy>(self.world_mut(), entity, online));
    }

    pub fn set_output(&mut self, entity: Entity, base_output: f32) {
        let mut producer = self
            .world_mut()
            .get_mut::<Producer<Energy>>(entity)
            .unwrap();
        producer.base_output = base_output;
    }

    pub fn deconstruct(&mut self, entity: Entity) {
        assert!(placement::deconstruct(self.world_mut(), entity));
    }
}
