//! Placement validation and the structure lifecycle entry points.
//!
//! Placement is synchronous: a rejected placement returns an error and leaves
//! the world untouched, no event fires either way. Accepted producers and
//! conduits dirty their owner's coverage so the next tick rebuilds it.

use std::fmt;

use bevy::prelude::*;

use crate::capabilities::Terrain;
use crate::components::{Conduit, Consumer, Producer};
use crate::network::NetworkState;
use crate::network_kind::{Energy, Fluid, NetworkKind};
use crate::player::PlayerId;

/// Why a structure could not be placed or registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// Owner id outside `1..=max_players`.
    InvalidPlayer(u8),
    OutOfBounds,
    /// The terrain provider refused the tile.
    NotBuildable,
    /// Another structure of the same network already sits on the tile.
    Occupied,
    /// The tile is covered by a different player.
    ForeignTerritory { owner: u8 },
    /// The entity is already registered in this network.
    AlreadyRegistered,
    /// The network's state resource is not installed.
    NetworkUnavailable,
    /// The target entity does not exist.
    UnknownEntity,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::InvalidPlayer(id) => write!(f, "invalid player id {id}"),
            PlacementError::OutOfBounds => write!(f, "tile is outside the map"),
            PlacementError::NotBuildable => write!(f, "terrain is not buildable"),
            PlacementError::Occupied => write!(f, "tile is already occupied"),
            PlacementError::ForeignTerritory { owner } => {
                write!(f, "tile is covered by player {owner}")
            }
            PlacementError::AlreadyRegistered => write!(f, "entity is already registered"),
            PlacementError::NetworkUnavailable => write!(f, "utility network is not installed"),
            PlacementError::UnknownEntity => write!(f, "entity does not exist"),
        }
    }
}

impl std::error::Error for PlacementError {}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check a prospective placement of `owner` at `(x, y)` without mutating
/// anything.
pub fn validate_placement<K: NetworkKind>(
    world: &World,
    owner: PlayerId,
    x: usize,
    y: usize,
) -> Result<(), PlacementError> {
    let state = world
        .get_resource::<NetworkState<K>>()
        .ok_or(PlacementError::NetworkUnavailable)?;
    if !owner.is_valid(state.max_players()) {
        return Err(PlacementError::InvalidPlayer(owner.0));
    }
    if !state.grid().in_bounds(x, y) {
        return Err(PlacementError::OutOfBounds);
    }
    let buildable = world
        .get_resource::<Terrain>()
        .map_or(true, |terrain| terrain.is_buildable(x, y));
    if !buildable {
        return Err(PlacementError::NotBuildable);
    }
    if state.topology().is_occupied((x, y)) {
        return Err(PlacementError::Occupied);
    }
    let tile_owner = state.grid().owner_at(x, y);
    if tile_owner != 0 && tile_owner != owner.0 {
        return Err(PlacementError::ForeignTerritory { owner: tile_owner });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

pub fn place_producer<K: NetworkKind>(world: &mut World, producer: Producer<K>) -> Result<Entity, PlacementError> {
    validate_placement::<K>(world, producer.owner, producer.grid_x, producer.grid_y)?;
    let entity = world.spawn_empty().id();
    let registered = world.resource_mut::<NetworkState<K>>().register_producer(entity, &producer);
    finish_spawn(world, entity, producer, registered)
}

pub fn place_conduit<K: NetworkKind>(world: &mut World, conduit: Conduit<K>) -> Result<Entity, PlacementError> {
    validate_placement::<K>(world, conduit.owner, conduit.grid_x, conduit.grid_y)?;
    let entity = world.spawn_empty().id();
    let registered = world.resource_mut::<NetworkState<K>>().register_conduit(entity, &conduit);
    finish_spawn(world, entity, conduit, registered)
}

pub fn place_consumer<K: NetworkKind>(world: &mut World, consumer: Consumer<K>) -> Result<Entity, PlacementError> {
    validate_placement::<K>(world, consumer.owner, consumer.grid_x, consumer.grid_y)?;
    let entity = world.spawn_empty().id();
    let registered = world.resource_mut::<NetworkState<K>>().register_consumer(entity, &consumer);
    finish_spawn(world, entity, consumer, registered)
}

/// Add a consumer role for network `K` to an existing building, e.g. a house
/// that already draws power and now also needs water.
pub fn attach_consumer<K: NetworkKind>(
    world: &mut World,
    entity: Entity,
    consumer: Consumer<K>,
) -> Result<(), PlacementError> {
    validate_placement::<K>(world, consumer.owner, consumer.grid_x, consumer.grid_y)?;
    if !world.entities().contains(entity) {
        return Err(PlacementError::UnknownEntity);
    }
    world
        .resource_mut::<NetworkState<K>>()
        .register_consumer(entity, &consumer)?;
    world.entity_mut(entity).insert(consumer);
    Ok(())
}

fn finish_spawn<C: Component>(
    world: &mut World,
    entity: Entity,
    component: C,
    registered: Result<(), PlacementError>,
) -> Result<Entity, PlacementError> {
    match registered {
        Ok(()) => {
            world.entity_mut(entity).insert(component);
            Ok(entity)
        }
        Err(err) => {
            world.despawn(entity);
            Err(err)
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Unregister `entity` from every utility network and despawn it. Returns
/// false when the entity did not exist.
pub fn deconstruct(world: &mut World, entity: Entity) -> bool {
    unregister_from::<Energy>(world, entity);
    unregister_from::<Fluid>(world, entity);
    world.despawn(entity)
}

fn unregister_from<K: NetworkKind>(world: &mut World, entity: Entity) {
    if let Some(mut state) = world.get_resource_mut::<NetworkState<K>>() {
        state.unregister(entity);
    }
}

/// Switch a producer on or off. The topology picks the change up on the next
/// tick and dirties the owner. Returns false when `entity` has no producer
/// for network `K`.
pub fn set_producer_online<K: NetworkKind>(world: &mut World, entity: Entity, online: bool) -> bool {
    let Some(mut producer) = world.get_mut::<Producer<K>>(entity) else {
        return false;
    };
    if producer.online != online {
        producer.online = online;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(PlacementError::InvalidPlayer(0).to_string(), "invalid player id 0");
        let msg = PlacementError::ForeignTerritory { owner: 3 }.to_string();
        assert!(msg.contains("player 3"), "got: {msg}");
    }

    #[test]
    fn test_error_is_error_trait() {
        let err: Box<dyn std::error::Error> = Box::new(PlacementError::Occupied);
        assert!(std::error::Error::source(err.as_ref()).is_none());
        assert_eq!(err.to_string(), "tile is already occupied");
    }
}
