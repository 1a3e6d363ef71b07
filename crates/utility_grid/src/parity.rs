//! Parity checksums for lockstep verification.
//!
//! Two instances fed the same structures and tick number must agree on one
//! `u32` per network per tick. The checksum covers, in fixed order:
//!
//! 1. Tick number and network label
//! 2. Coverage owner bytes, row-major
//! 3. Pool snapshots, players ascending
//! 4. The tick's events, players ascending, in emission order
//!
//! Everything is bitcode-encoded and hashed with xxHash32. Floats are carried
//! as their bit patterns through the encoding.

use bitcode::Encode;
use xxhash_rust::xxh32::xxh32;

use crate::network::NetworkState;
use crate::network_kind::{NetworkKind, NetworkLabel};
use crate::player::PlayerId;
use crate::pool::PoolSnapshot;
use crate::events::{UtilityEvent, UtilityEventKind};

const PARITY_SEED: u32 = 0;

#[derive(Encode)]
struct EventDigest {
    tick: u64,
    player: PlayerId,
    code: u8,
    entity: u64,
    was: bool,
    now: bool,
}

impl From<&UtilityEvent> for EventDigest {
    fn from(event: &UtilityEvent) -> Self {
        let (entity, was, now) = match event.kind {
            UtilityEventKind::ConsumerStateChanged { entity, was, now } => (entity.to_bits(), was, now),
            _ => (0, false, false),
        };
        Self {
            tick: event.tick,
            player: event.player,
            code: event.kind.code(),
            entity,
            was,
            now,
        }
    }
}

#[derive(Encode)]
struct NetworkDigest {
    tick: u64,
    network: NetworkLabel,
    owners: Vec<u8>,
    pools: Vec<PoolSnapshot>,
    events: Vec<EventDigest>,
}

/// The encoded digest the checksum is taken over. Exposed so a mismatch can
/// be diffed byte by byte.
pub fn network_digest<K: NetworkKind>(state: &NetworkState<K>) -> Vec<u8> {
    let digest = NetworkDigest {
        tick: state.last_tick(),
        network: K::LABEL,
        owners: state.grid().owners().to_vec(),
        pools: PlayerId::all(state.max_players())
            .map(|player| state.pool(player))
            .collect(),
        events: state.events().map(EventDigest::from).collect(),
    };
    bitcode::encode(&digest)
}

pub fn network_checksum<K: NetworkKind>(state: &NetworkState<K>) -> u32 {
    xxh32(&network_digest(state), PARITY_SEED)
}
