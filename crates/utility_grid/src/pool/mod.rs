//! Per-player pool: aggregation and the Healthy/Marginal/Deficit/Collapse
//! state machine.

pub mod aggregate;
pub mod types;

#[cfg(test)]
mod tests;

pub use aggregate::{aggregate, ConsumerSlot, ProducerSample};
pub use types::{classify, PoolSnapshot, PoolState};
