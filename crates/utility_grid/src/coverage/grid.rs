use crate::config::{GRID_HEIGHT, GRID_WIDTH};
use crate::player::PlayerId;

/// Owner byte meaning "no player covers this tile".
pub const UNCOVERED: u8 = 0;

/// Dense per-tile record of which player's network currently covers a tile.
///
/// Indexed as `y * width + x`. Out-of-bounds reads report [`UNCOVERED`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageGrid {
    owners: Vec<u8>,
    width: usize,
    height: usize,
}

impl Default for CoverageGrid {
    fn default() -> Self {
        Self::new(GRID_WIDTH, GRID_HEIGHT)
    }
}

impl CoverageGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            owners: vec![UNCOVERED; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Owner byte at a tile, [`UNCOVERED`] when out of bounds.
    #[inline]
    pub fn owner_at(&self, x: usize, y: usize) -> u8 {
        if !self.in_bounds(x, y) {
            return UNCOVERED;
        }
        self.owners[self.index(x, y)]
    }

    #[inline]
    pub fn covered_by(&self, x: usize, y: usize, player: PlayerId) -> bool {
        player.0 != UNCOVERED && self.owner_at(x, y) == player.0
    }

    /// Raw owner bytes in row-major order.
    pub fn owners(&self) -> &[u8] {
        &self.owners
    }

    pub(crate) fn owners_mut(&mut self) -> &mut [u8] {
        &mut self.owners
    }

    pub fn covered_count(&self, player: PlayerId) -> usize {
        self.owners.iter().filter(|&&o| o == player.0).count()
    }

    /// Clear every tile owned by `player`, returning the cleared indices.
    pub fn clear_player(&mut self, player: PlayerId) -> Vec<usize> {
        let mut cleared = Vec::new();
        for (idx, owner) in self.owners.iter_mut().enumerate() {
            if *owner == player.0 {
                *owner = UNCOVERED;
                cleared.push(idx);
            }
        }
        cleared
    }
}
