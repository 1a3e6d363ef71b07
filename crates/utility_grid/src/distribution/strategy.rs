use crate::config::UtilityParams;
use crate::player::PlayerId;
use crate::pool::{ConsumerSlot, PoolSnapshot, ProducerSample};

/// Everything a strategy may look at for one player's tick.
#[derive(Debug, Clone, Copy)]
pub struct SupplyFrame<'a> {
    pub player: PlayerId,
    /// This player's producers, sorted by entity.
    pub producers: &'a [ProducerSample],
    pub params: &'a UtilityParams,
}

/// How a network turns a classified pool into per-consumer grants.
///
/// The pipeline calls the three hooks in order for each player:
/// `release` before classification, `allocate` on the covered consumers, and
/// `settle` once the tick's grants are final.
pub trait DistributionStrategy: Default + Send + Sync + 'static {
    /// Extra supply folded into `total_generated` before the pool is
    /// classified.
    fn release(&mut self, _frame: &SupplyFrame, _pool: &PoolSnapshot) -> f32 {
        0.0
    }

    /// Grant or deny every slot in `covered`. Uncovered consumers never reach
    /// a strategy.
    fn allocate(&mut self, frame: &SupplyFrame, pool: &PoolSnapshot, covered: &mut [&mut ConsumerSlot]);

    fn settle(&mut self, _frame: &SupplyFrame, _pool: &PoolSnapshot) {}

    /// Drop all carried state, e.g. after a load.
    fn reset(&mut self) {}
}
