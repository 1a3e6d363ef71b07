//! Grid constants and tunable utility parameters.
//!
//! The constants fix the shape of the dense per-tile arrays. Everything a
//! designer may want to tune at runtime lives in [`UtilityParams`], which is a
//! plain serde type so it can be loaded from a JSON/TOML document by the host.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub const GRID_WIDTH: usize = 256;
pub const GRID_HEIGHT: usize = 256;

/// Highest supported player id. Player ids occupy `1..=MAX_PLAYERS`; the
/// coverage grid reserves owner byte 0 for "uncovered".
pub const MAX_PLAYERS: u8 = 8;

/// Version byte written at offset 0 of every persisted record.
pub const RECORD_VERSION: u8 = 1;

// ---------------------------------------------------------------------------
// Runtime parameters
// ---------------------------------------------------------------------------

/// Reservoir tunables for the fluid network. Fill and drain are deliberately
/// asymmetric: storage refills slowly and empties fast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservoirParams {
    /// Maximum amount stored per tick of surplus.
    pub fill_rate: f32,
    /// Maximum amount released per tick of deficit.
    pub drain_rate: f32,
}

impl Default for ReservoirParams {
    fn default() -> Self {
        Self {
            fill_rate: 5.0,
            drain_rate: 15.0,
        }
    }
}

/// Pool classification thresholds and strategy tunables shared by every
/// utility network.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityParams {
    /// Surplus at or above `total_generated * buffer_threshold_percent` is Healthy.
    pub buffer_threshold_percent: f32,
    /// Deficit magnitude at or beyond `total_consumed * collapse_threshold_percent`
    /// is Collapse.
    pub collapse_threshold_percent: f32,
    #[serde(default)]
    pub reservoir: ReservoirParams,
}

impl Default for UtilityParams {
    fn default() -> Self {
        Self {
            buffer_threshold_percent: 0.10,
            collapse_threshold_percent: 0.50,
            reservoir: ReservoirParams::default(),
        }
    }
}
