//! Reservoir-buffered, all-or-nothing distribution for the fluid network.
//!
//! Each player owns one reservoir whose capacity is the sum of the storage
//! tanks on its online producers. Surplus trickles in at `fill_rate`; a
//! deficit is covered from storage at up to `drain_rate` before the pool is
//! classified, so short dips never degrade the pool state.

use std::collections::BTreeMap;

use bevy::prelude::*;

use super::strategy::{DistributionStrategy, SupplyFrame};
use crate::player::PlayerId;
use crate::pool::{ConsumerSlot, PoolSnapshot};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReservoirLevel {
    pub stored: f32,
    pub capacity: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservoirBuffered {
    levels: BTreeMap<PlayerId, ReservoirLevel>,
}

impl ReservoirBuffered {
    pub fn level(&self, player: PlayerId) -> ReservoirLevel {
        self.levels.get(&player).copied().unwrap_or_default()
    }

    /// Seed a player's stored amount, clamped to its last known capacity.
    #[cfg(test)]
    pub(crate) fn set_stored(&mut self, player: PlayerId, stored: f32, capacity: f32) {
        let capacity = capacity.max(0.0);
        self.levels.insert(
            player,
            ReservoirLevel {
                stored: stored.clamp(0.0, capacity),
                capacity,
            },
        );
    }
}

impl DistributionStrategy for ReservoirBuffered {
    fn release(&mut self, frame: &SupplyFrame, pool: &PoolSnapshot) -> f32 {
        let capacity: f32 = frame
            .producers
            .iter()
            .filter(|p| p.owner == frame.player && p.online)
            .map(|p| p.storage.max(0.0))
            .sum();

        let level = self.levels.entry(frame.player).or_default();
        level.capacity = capacity;
        level.stored = level.stored.min(capacity);

        if pool.surplus >= 0.0 || level.stored <= 0.0 {
            return 0.0;
        }
        let released = (-pool.surplus)
            .min(frame.params.reservoir.drain_rate)
            .min(level.stored);
        level.stored -= released;
        debug!(
            "fluid reservoir for player {} released {:.2} ({:.2} left)",
            frame.player.0, released, level.stored
        );
        released
    }

    fn allocate(&mut self, _frame: &SupplyFrame, pool: &PoolSnapshot, covered: &mut [&mut ConsumerSlot]) {
        let serve = pool.surplus >= 0.0;
        for slot in covered.iter_mut() {
            if serve {
                slot.grant();
            } else {
                slot.deny();
            }
        }
    }

    fn settle(&mut self, frame: &SupplyFrame, pool: &PoolSnapshot) {
        if pool.surplus <= 0.0 {
            return;
        }
        let level = self.levels.entry(frame.player).or_default();
        let room = (level.capacity - level.stored).max(0.0);
        level.stored += pool.surplus.min(frame.params.reservoir.fill_rate).min(room);
    }

    fn reset(&mut self) {
        self.levels.clear();
    }
}
