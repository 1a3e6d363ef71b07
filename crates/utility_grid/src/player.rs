use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Owning player of a facility. Valid ids are `1..=max_players`; the value is
/// also the owner byte written into the coverage grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct PlayerId(pub u8);

impl PlayerId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// True when the id addresses a real player slot.
    #[inline]
    pub fn is_valid(self, max_players: u8) -> bool {
        self.0 >= 1 && self.0 <= max_players
    }

    /// All valid player ids in ascending order.
    pub fn all(max_players: u8) -> impl Iterator<Item = PlayerId> {
        (1..=max_players).map(PlayerId)
    }
}
