//! Pool snapshot and the four-state health classification.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::config::UtilityParams;

/// Health of a player's pool for one tick.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode, Default,
)]
pub enum PoolState {
    /// Surplus at or above the buffer threshold.
    #[default]
    Healthy,
    /// Non-negative surplus below the buffer threshold.
    Marginal,
    /// Short, but by less than the collapse fraction of consumption.
    Deficit,
    /// Short by at least the collapse fraction of consumption.
    Collapse,
}

impl PoolState {
    pub fn name(self) -> &'static str {
        match self {
            PoolState::Healthy => "Healthy",
            PoolState::Marginal => "Marginal",
            PoolState::Deficit => "Deficit",
            PoolState::Collapse => "Collapse",
        }
    }

    /// Deficit or Collapse.
    pub fn is_short(self) -> bool {
        matches!(self, PoolState::Deficit | PoolState::Collapse)
    }

    pub fn code(self) -> u8 {
        match self {
            PoolState::Healthy => 0,
            PoolState::Marginal => 1,
            PoolState::Deficit => 2,
            PoolState::Collapse => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => PoolState::Healthy,
            1 => PoolState::Marginal,
            2 => PoolState::Deficit,
            3 => PoolState::Collapse,
            _ => return None,
        })
    }
}

/// Classify a pool from its totals.
///
/// - `surplus >= generated * buffer` is Healthy
/// - `surplus >= 0` is Marginal
/// - `surplus > -(consumed * collapse)` is Deficit
/// - anything lower is Collapse
pub fn classify(total_generated: f32, total_consumed: f32, params: &UtilityParams) -> PoolState {
    let surplus = total_generated - total_consumed;
    let buffer = total_generated * params.buffer_threshold_percent;
    let collapse_floor = total_consumed * params.collapse_threshold_percent;
    if surplus >= buffer {
        PoolState::Healthy
    } else if surplus >= 0.0 {
        PoolState::Marginal
    } else if surplus > -collapse_floor {
        PoolState::Deficit
    } else {
        PoolState::Collapse
    }
}

/// A player's aggregate supply/demand for one tick. Rebuilt wholesale every
/// tick; `surplus == total_generated - total_consumed` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode, Default)]
pub struct PoolSnapshot {
    pub total_generated: f32,
    pub total_consumed: f32,
    pub surplus: f32,
    /// Online producers contributing to `total_generated`.
    pub producer_count: u32,
    /// In-coverage consumers contributing to `total_consumed`.
    pub consumer_count: u32,
    pub state: PoolState,
    pub previous_state: PoolState,
}

impl PoolSnapshot {
    pub fn new(total_generated: f32, total_consumed: f32, producer_count: u32, consumer_count: u32) -> Self {
        Self {
            total_generated,
            total_consumed,
            surplus: total_generated - total_consumed,
            producer_count,
            consumer_count,
            state: PoolState::Healthy,
            previous_state: PoolState::Healthy,
        }
    }

    /// Fold extra supply (e.g. a reservoir release) into the totals.
    pub fn add_supply(&mut self, amount: f32) {
        self.total_generated += amount;
        self.surplus = self.total_generated - self.total_consumed;
    }

    /// Set `state` from the totals, carrying `previous` as the prior tick's state.
    pub fn classify(&mut self, previous: PoolState, params: &UtilityParams) {
        self.previous_state = previous;
        self.state = classify(self.total_generated, self.total_consumed, params);
    }

    pub fn transitioned(&self) -> bool {
        self.state != self.previous_state
    }
}
