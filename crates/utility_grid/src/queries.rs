//! Read-only query surface for other subsystems.
//!
//! Every method answers from the last completed tick and falls back to a
//! conservative default (unpowered, zero, empty pool) for missing state,
//! despawned entities and invalid players.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::components::{Consumer, Producer};
use crate::network::NetworkState;
use crate::network_kind::{NetworkKind, SourceType};
use crate::player::PlayerId;
use crate::pool::PoolSnapshot;
use crate::topology::NodeRole;

/// An online producer that feeds the pollution subsystem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContaminationSource {
    pub x: usize,
    pub y: usize,
    pub output: f32,
    pub radius: u32,
    pub owner: PlayerId,
}

#[derive(SystemParam)]
pub struct UtilityQuery<'w, 's, K: NetworkKind> {
    state: Option<Res<'w, NetworkState<K>>>,
    consumers: Query<'w, 's, &'static Consumer<K>>,
    producers: Query<'w, 's, (Entity, &'static Producer<K>)>,
}

impl<K: NetworkKind> UtilityQuery<'_, '_, K> {
    /// Whether `entity`'s consumer was satisfied last tick.
    pub fn is_powered(&self, entity: Entity) -> bool {
        self.state.is_some() && self.consumers.get(entity).is_ok_and(|c| c.satisfied)
    }

    /// Whether `(x, y)` lies in `player`'s coverage.
    pub fn is_powered_at(&self, x: usize, y: usize, player: PlayerId) -> bool {
        self.state
            .as_ref()
            .is_some_and(|state| state.covered_by(x, y, player))
    }

    pub fn get_required(&self, entity: Entity) -> f32 {
        self.consumers.get(entity).map_or(0.0, |c| c.required)
    }

    pub fn get_received(&self, entity: Entity) -> f32 {
        if self.state.is_none() {
            return 0.0;
        }
        self.consumers.get(entity).map_or(0.0, |c| c.received)
    }

    pub fn get_pool(&self, player: PlayerId) -> PoolSnapshot {
        self.state
            .as_ref()
            .map_or_else(PoolSnapshot::default, |state| state.pool(player))
    }

    /// Online, contaminating producers registered with the network, ordered
    /// by entity. Position and owner come from the topology.
    pub fn get_contamination_sources(&self) -> Vec<ContaminationSource> {
        let Some(state) = self.state.as_ref() else {
            return Vec::new();
        };
        let mut found: Vec<(Entity, ContaminationSource)> = self
            .producers
            .iter()
            .filter(|(_, p)| p.online && p.source.contaminates())
            .filter_map(|(entity, p)| {
                let Some((NodeRole::Producer, (x, y), owner)) = state.topology().locate(entity) else {
                    return None;
                };
                Some((
                    entity,
                    ContaminationSource {
                        x,
                        y,
                        output: p.current_output,
                        radius: p.coverage_radius,
                        owner,
                    },
                ))
            })
            .collect();
        found.sort_by_key(|(entity, _)| *entity);
        found.into_iter().map(|(_, source)| source).collect()
    }
}
