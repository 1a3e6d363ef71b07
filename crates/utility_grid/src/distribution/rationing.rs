//! Priority rationing for the energy network.

use super::strategy::{DistributionStrategy, SupplyFrame};
use crate::pool::{ConsumerSlot, PoolSnapshot};

/// Serve everyone while the pool has a non-negative surplus; otherwise ration
/// `total_generated` by priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriorityRationing;

impl DistributionStrategy for PriorityRationing {
    fn allocate(&mut self, _frame: &SupplyFrame, pool: &PoolSnapshot, covered: &mut [&mut ConsumerSlot]) {
        if pool.surplus >= 0.0 {
            covered.iter_mut().for_each(|slot| slot.grant());
        } else {
            ration(pool.total_generated, covered);
        }
    }
}

/// Grant full requirements in `(priority, entity)` order until one does not
/// fit. That consumer and every one after it get nothing; there are no
/// partial grants. Returns the supply left over.
///
/// `available` is the pool's total generation, not its (negative) surplus.
pub fn ration(available: f32, slots: &mut [&mut ConsumerSlot]) -> f32 {
    slots.sort_by_key(|slot| (slot.priority, slot.entity));

    let mut remaining = available.max(0.0);
    let mut exhausted = false;
    for slot in slots.iter_mut() {
        if !exhausted && remaining >= slot.required {
            remaining -= slot.required;
            slot.grant();
        } else {
            exhausted = true;
            slot.deny();
        }
    }
    remaining
}
