//! Per-player coverage dirty flags.
//!
//! A player's coverage is rebuilt only on ticks where its flag is set. Flags
//! are set by placement/removal/online changes and cleared right after the
//! rebuild completes.

use crate::coverage::CoverageOutcome;
use crate::player::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirtyFlags {
    /// Indexed by player id; slot 0 is never used.
    dirty: Vec<bool>,
    /// Players whose last rebuild was refused tiles held by a lower id.
    blocked: Vec<bool>,
}

impl DirtyFlags {
    pub fn new(max_players: u8) -> Self {
        let len = max_players as usize + 1;
        Self {
            dirty: vec![false; len],
            blocked: vec![false; len],
        }
    }

    pub fn is_dirty(&self, player: PlayerId) -> bool {
        player.0 != 0 && self.dirty.get(player.index()).copied().unwrap_or(false)
    }

    /// Invalid ids are ignored.
    pub fn mark(&mut self, player: PlayerId) {
        if player.0 == 0 {
            return;
        }
        if let Some(flag) = self.dirty.get_mut(player.index()) {
            *flag = true;
        }
    }

    pub fn mark_all(&mut self) {
        self.dirty.iter_mut().skip(1).for_each(|flag| *flag = true);
    }

    /// Clear `player`'s flag after a completed rebuild. Displaced players
    /// rebuild to learn they are now blocked; released tiles wake every player
    /// that was previously refused them.
    pub fn finish_rebuild(&mut self, player: PlayerId, outcome: &CoverageOutcome) {
        let idx = player.index();
        if idx == 0 || idx >= self.dirty.len() {
            return;
        }
        self.dirty[idx] = false;
        self.blocked[idx] = outcome.blocked;
        for other in &outcome.displaced {
            self.mark(*other);
        }
        if outcome.released {
            for (other, blocked) in self.blocked.iter().enumerate() {
                if *blocked && other != idx {
                    self.dirty[other] = true;
                }
            }
        }
    }
}
