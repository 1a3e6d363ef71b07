use bevy::prelude::*;

use super::types::PoolSnapshot;
use crate::components::LoadPriority;
use crate::coverage::CoverageGrid;
use crate::player::PlayerId;
use crate::topology::GridPos;

/// One producer as seen by a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProducerSample {
    pub entity: Entity,
    pub owner: PlayerId,
    pub output: f32,
    pub online: bool,
    /// Attached storage capacity, 0 when the producer has no tank.
    pub storage: f32,
}

/// One consumer's inputs and the distributor's outputs for a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsumerSlot {
    pub entity: Entity,
    pub owner: PlayerId,
    pub pos: GridPos,
    pub required: f32,
    pub priority: LoadPriority,
    pub received: f32,
    pub satisfied: bool,
}

impl ConsumerSlot {
    pub fn new(entity: Entity, owner: PlayerId, pos: GridPos, required: f32, priority: LoadPriority) -> Self {
        Self {
            entity,
            owner,
            pos,
            required: required.max(0.0),
            priority,
            received: 0.0,
            satisfied: false,
        }
    }

    pub fn grant(&mut self) {
        self.received = self.required;
        self.satisfied = true;
    }

    pub fn deny(&mut self) {
        self.received = 0.0;
        self.satisfied = false;
    }

    pub fn is_covered(&self, grid: &CoverageGrid) -> bool {
        grid.covered_by(self.pos.0, self.pos.1, self.owner)
    }
}

/// Sum `player`'s online producer output and the demand of its consumers that
/// sit on tiles `player` covers.
///
/// Samples are summed in entity order, so the totals are bit-identical no
/// matter how the caller collected them.
pub fn aggregate(
    player: PlayerId,
    producers: &[ProducerSample],
    consumers: &[ConsumerSlot],
    grid: &CoverageGrid,
) -> PoolSnapshot {
    let mut online: Vec<&ProducerSample> = producers
        .iter()
        .filter(|p| p.owner == player && p.online)
        .collect();
    online.sort_by_key(|p| p.entity);

    let mut covered: Vec<&ConsumerSlot> = consumers
        .iter()
        .filter(|c| c.owner == player && c.is_covered(grid))
        .collect();
    covered.sort_by_key(|c| c.entity);

    let total_generated: f32 = online.iter().map(|p| p.output).sum();
    let total_consumed: f32 = covered.iter().map(|c| c.required).sum();

    PoolSnapshot::new(
        total_generated,
        total_consumed,
        online.len() as u32,
        covered.len() as u32,
    )
}
