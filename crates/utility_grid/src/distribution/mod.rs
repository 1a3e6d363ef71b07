//! Distributor: turns a classified pool into per-consumer grants. Coverage is
//! a hard gate applied here; everything past the gate is up to the network's
//! strategy.

pub mod rationing;
pub mod reservoir;
pub mod strategy;


pub use rationing::{ration, PriorityRationing};
pub use reservoir::{ReservoirBuffered, ReservoirLevel};
pub use strategy::{DistributionStrategy, SupplyFrame};

use crate::coverage::CoverageGrid;
use crate::pool::{ConsumerSlot, PoolSnapshot};

/// Write `received`/`satisfied` for every slot owned by `frame.player`.
/// Consumers off the player's coverage always get nothing.
pub fn distribute<S: DistributionStrategy>(
    strategy: &mut S,
    frame: &SupplyFrame,
    pool: &PoolSnapshot,
    grid: &CoverageGrid,
    slots: &mut [ConsumerSlot],
) {
    let mut covered: Vec<&mut ConsumerSlot> = Vec::with_capacity(slots.len());
    for slot in slots.iter_mut().filter(|s| s.owner == frame.player) {
        if slot.is_covered(grid) {
            covered.push(slot);
        } else {
            slot.deny();
        }
    }
    strategy.allocate(frame, pool, &mut covered);
}
