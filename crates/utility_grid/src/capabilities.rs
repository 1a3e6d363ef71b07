//! Capability interfaces consumed from, and offered to, neighbouring
//! subsystems. Each capability has a real implementation and a permissive
//! stub used before the real subsystem exists; callers pick one at
//! construction time.

use bevy::prelude::*;

use crate::coverage::CoverageGrid;
use crate::player::PlayerId;

// ---------------------------------------------------------------------------
// Terrain
// ---------------------------------------------------------------------------

/// Terrain buildability, queried only while validating a placement.
pub trait TerrainProvider: Send + Sync + 'static {
    fn is_buildable(&self, x: usize, y: usize) -> bool;
}

/// Accepts every tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenTerrain;

impl TerrainProvider for OpenTerrain {
    fn is_buildable(&self, _x: usize, _y: usize) -> bool {
        true
    }
}

/// Dense per-tile buildable mask. Tiles outside the mask are not buildable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainMask {
    buildable: Vec<bool>,
    width: usize,
    height: usize,
}

impl TerrainMask {
    /// A fully buildable mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            buildable: vec![true; width * height],
            width,
            height,
        }
    }

    pub fn set(&mut self, x: usize, y: usize, buildable: bool) {
        if x < self.width && y < self.height {
            self.buildable[y * self.width + x] = buildable;
        }
    }

    /// Mark a horizontal strip unbuildable, e.g. a river.
    pub fn block_row(&mut self, y: usize, x0: usize, x1: usize) {
        for x in x0..=x1 {
            self.set(x, y, false);
        }
    }
}

impl TerrainProvider for TerrainMask {
    fn is_buildable(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.buildable[y * self.width + x]
    }
}

/// Installed terrain provider. Defaults to [`OpenTerrain`].
#[derive(Resource)]
pub struct Terrain(pub Box<dyn TerrainProvider>);

impl Terrain {
    pub fn new(provider: impl TerrainProvider) -> Self {
        Self(Box::new(provider))
    }

    pub fn is_buildable(&self, x: usize, y: usize) -> bool {
        self.0.is_buildable(x, y)
    }
}

impl Default for Terrain {
    fn default() -> Self {
        Self::new(OpenTerrain)
    }
}

// ---------------------------------------------------------------------------
// Service availability
// ---------------------------------------------------------------------------

/// Whether a utility reaches a tile for a player. Spawn checks in other
/// subsystems hold one of these instead of the network state itself.
pub trait ServiceAvailability {
    fn is_available(&self, x: usize, y: usize, player: PlayerId) -> bool;
}

impl ServiceAvailability for CoverageGrid {
    fn is_available(&self, x: usize, y: usize, player: PlayerId) -> bool {
        player.0 != 0 && self.covered_by(x, y, player)
    }
}

/// Reports every tile as served.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAvailable;

impl ServiceAvailability for AlwaysAvailable {
    fn is_available(&self, _x: usize, _y: usize, _player: PlayerId) -> bool {
        true
    }
}
