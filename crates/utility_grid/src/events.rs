//! Tick events: consumer satisfaction flips and pool deficit/collapse edges.
//!
//! Events are buffered per player inside the network state during the tick,
//! then published as a bevy [`Event`] in `PostSim`. Building them never
//! mutates pool or coverage state.

use bevy::prelude::*;

use crate::network_kind::NetworkLabel;
use crate::player::PlayerId;
use crate::pool::PoolState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilityEventKind {
    ConsumerStateChanged { entity: Entity, was: bool, now: bool },
    DeficitBegan,
    DeficitEnded,
    CollapseBegan,
    CollapseEnded,
}

impl UtilityEventKind {
    pub fn is_pool_event(&self) -> bool {
        !matches!(self, UtilityEventKind::ConsumerStateChanged { .. })
    }

    /// Stable tag for digests and logs.
    pub fn code(&self) -> u8 {
        match self {
            UtilityEventKind::ConsumerStateChanged { .. } => 0,
            UtilityEventKind::DeficitBegan => 1,
            UtilityEventKind::DeficitEnded => 2,
            UtilityEventKind::CollapseBegan => 3,
            UtilityEventKind::CollapseEnded => 4,
        }
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtilityEvent {
    pub network: NetworkLabel,
    pub tick: u64,
    pub player: PlayerId,
    pub kind: UtilityEventKind,
}

/// Pool-level events for a `previous -> current` transition.
///
/// Deficit covers both Deficit and Collapse, so sliding from Deficit into
/// Collapse only begins the collapse. Entering emits deficit before collapse;
/// leaving emits them in reverse.
pub fn pool_transition_events(previous: PoolState, current: PoolState) -> Vec<UtilityEventKind> {
    let mut out = Vec::new();
    if previous == current {
        return out;
    }
    let was_collapsed = previous == PoolState::Collapse;
    let now_collapsed = current == PoolState::Collapse;

    if !previous.is_short() && current.is_short() {
        out.push(UtilityEventKind::DeficitBegan);
    }
    if !was_collapsed && now_collapsed {
        out.push(UtilityEventKind::CollapseBegan);
    }
    if was_collapsed && !now_collapsed {
        out.push(UtilityEventKind::CollapseEnded);
    }
    if previous.is_short() && !current.is_short() {
        out.push(UtilityEventKind::DeficitEnded);
    }
    out
}

/// A state-changed event when a consumer's satisfied flag flipped.
pub fn consumer_transition(entity: Entity, was: bool, now: bool) -> Option<UtilityEventKind> {
    (was != now).then_some(UtilityEventKind::ConsumerStateChanged { entity, was, now })
}
