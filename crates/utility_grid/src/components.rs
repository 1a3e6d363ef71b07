//! Facility components. Each is generic over the network marker so a single
//! building entity can take part in the energy and fluid networks at once.

use std::marker::PhantomData;

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::network_kind::NetworkKind;
use crate::player::PlayerId;

// =============================================================================
// LoadPriority
// =============================================================================

/// Rationing class of a consumer. Declaration order is service order:
/// Critical consumers are granted supply first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Encode,
    Decode,
    Default,
)]
pub enum LoadPriority {
    /// Hospitals, emergency services.
    Critical,
    /// Housing and shops.
    Important,
    #[default]
    Normal,
    /// Parks, plazas, decorative loads.
    Low,
}

impl LoadPriority {
    /// Numeric rank, 1 = served first.
    pub fn rank(self) -> u8 {
        match self {
            LoadPriority::Critical => 1,
            LoadPriority::Important => 2,
            LoadPriority::Normal => 3,
            LoadPriority::Low => 4,
        }
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        Some(match rank {
            1 => LoadPriority::Critical,
            2 => LoadPriority::Important,
            3 => LoadPriority::Normal,
            4 => LoadPriority::Low,
            _ => return None,
        })
    }
}

// =============================================================================
// Producer
// =============================================================================

/// A facility that generates supply for its owner's pool.
#[derive(Component, Debug, Clone)]
pub struct Producer<K: NetworkKind> {
    pub source: K::Source,
    pub owner: PlayerId,
    pub grid_x: usize,
    pub grid_y: usize,
    /// Nameplate output.
    pub base_output: f32,
    /// Maintenance-driven efficiency multiplier, written by collaborators.
    pub efficiency: f32,
    /// Age/weather multiplier, written by collaborators.
    pub condition: f32,
    /// `base_output * efficiency * condition`, refreshed every tick.
    pub current_output: f32,
    pub online: bool,
    pub coverage_radius: u32,
}

impl<K: NetworkKind> Producer<K> {
    pub fn new(
        source: K::Source,
        owner: PlayerId,
        grid_x: usize,
        grid_y: usize,
        base_output: f32,
        coverage_radius: u32,
    ) -> Self {
        Self {
            source,
            owner,
            grid_x,
            grid_y,
            base_output,
            efficiency: 1.0,
            condition: 1.0,
            current_output: base_output,
            online: true,
            coverage_radius,
        }
    }

    pub fn refresh_output(&mut self) {
        self.current_output =
            self.base_output.max(0.0) * self.efficiency.max(0.0) * self.condition.max(0.0);
    }
}

// =============================================================================
// Conduit
// =============================================================================

/// A line/pipe segment relaying coverage outward from producers.
///
/// `is_connected` and `is_active` are derived by every flood fill and are
/// never persisted.
#[derive(Component, Debug, Clone)]
pub struct Conduit<K: NetworkKind> {
    pub owner: PlayerId,
    pub grid_x: usize,
    pub grid_y: usize,
    pub coverage_radius: u32,
    pub is_connected: bool,
    /// Connected and the owner's pool has nonzero generation. Presentation only.
    pub is_active: bool,
    _network: PhantomData<K>,
}

impl<K: NetworkKind> Conduit<K> {
    pub fn new(owner: PlayerId, grid_x: usize, grid_y: usize, coverage_radius: u32) -> Self {
        Self {
            owner,
            grid_x,
            grid_y,
            coverage_radius,
            is_connected: false,
            is_active: false,
            _network: PhantomData,
        }
    }
}

// =============================================================================
// Consumer
// =============================================================================

/// A facility that requires supply. `received` and `satisfied` are tick-local
/// and overwritten by every distribution pass.
#[derive(Component, Debug, Clone)]
pub struct Consumer<K: NetworkKind> {
    pub owner: PlayerId,
    pub grid_x: usize,
    pub grid_y: usize,
    pub required: f32,
    pub received: f32,
    pub satisfied: bool,
    pub priority: LoadPriority,
    _network: PhantomData<K>,
}

impl<K: NetworkKind> Consumer<K> {
    pub fn new(
        owner: PlayerId,
        grid_x: usize,
        grid_y: usize,
        required: f32,
        priority: LoadPriority,
    ) -> Self {
        Self {
            owner,
            grid_x,
            grid_y,
            required,
            received: 0.0,
            satisfied: false,
            priority,
            _network: PhantomData,
        }
    }
}

// =============================================================================
// StorageTank
// =============================================================================

/// Optional storage attached to fluid producers. Presence of the component is
/// the signal; a producer without one stores nothing.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct StorageTank {
    pub capacity: f32,
}
