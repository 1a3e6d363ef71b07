// ---------------------------------------------------------------------------
// records – fixed-width little-endian records for save/load
// ---------------------------------------------------------------------------
//
// Every record starts with the format version byte (RECORD_VERSION).
//
// Producer (24 bytes):
//   [0]      version
//   [1]      owner
//   [2..4]   grid_x (u16)
//   [4..6]   grid_y (u16)
//   [6..10]  base_output (f32)
//   [10..14] efficiency (f32)
//   [14..18] condition (f32)
//   [18..20] coverage_radius (u16)
//   [20]     online (0/1)
//   [21]     source code
//   [22..24] reserved, written as zero
//
// Conduit (8 bytes):
//   [0] version  [1] owner  [2..4] grid_x  [4..6] grid_y  [6..8] coverage_radius
//
// Consumer (16 bytes):
//   [0]      version
//   [1]      owner
//   [2..4]   grid_x (u16)
//   [4..6]   grid_y (u16)
//   [6..10]  required (f32)
//   [10..14] received (f32)
//   [14]     priority rank (1..=4)
//   [15]     satisfied (0/1)
//
// Pool (24 bytes):
//   [0]      version
//   [1]      state code
//   [2]      previous state code
//   [3]      reserved
//   [4..8]   total_generated (f32)
//   [8..12]  total_consumed (f32)
//   [12..16] surplus (f32)
//   [16..20] producer_count (u32)
//   [20..24] consumer_count (u32)
//
// Coverage and conduit connected/active flags are derived and never stored:
// `restore_network` marks every player dirty so the first tick rebuilds them.

use std::fmt;

use bevy::prelude::*;

use crate::components::{Conduit, Consumer, LoadPriority, Producer};
use crate::config::RECORD_VERSION;
use crate::network::NetworkState;
use crate::network_kind::{NetworkKind, SourceType};
use crate::player::PlayerId;
use crate::pool::{PoolSnapshot, PoolState};

pub const PRODUCER_RECORD_SIZE: usize = 24;
pub const CONDUIT_RECORD_SIZE: usize = 8;
pub const CONSUMER_RECORD_SIZE: usize = 16;
pub const POOL_RECORD_SIZE: usize = 24;

/// A record could not be written or decoded. Loading stops at the first bad
/// record; there is no partial recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Version byte is zero or newer than this build writes.
    UnsupportedVersion { found: u8, supported: u8 },
    /// Fewer bytes than the record needs.
    Truncated { expected: usize, found: usize },
    /// A field holds a value outside its domain.
    InvalidField { field: &'static str, value: u32 },
    /// A component value does not fit its fixed-width field.
    OutOfRange { field: &'static str, value: u64 },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::UnsupportedVersion { found, supported } => write!(
                f,
                "unsupported record version {found} (this build reads 1..={supported})"
            ),
            RecordError::Truncated { expected, found } => {
                write!(f, "record truncated: need {expected} bytes, got {found}")
            }
            RecordError::InvalidField { field, value } => {
                write!(f, "invalid value {value} for field `{field}`")
            }
            RecordError::OutOfRange { field, value } => {
                write!(f, "value {value} does not fit field `{field}`")
            }
        }
    }
}

impl std::error::Error for RecordError {}

// ---------------------------------------------------------------------------
// Byte helpers
// ---------------------------------------------------------------------------

fn write_u16(value: u64, field: &'static str) -> Result<[u8; 2], RecordError> {
    u16::try_from(value)
        .map(u16::to_le_bytes)
        .map_err(|_| RecordError::OutOfRange { field, value })
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_f32(bytes: &[u8], at: usize, field: &'static str) -> Result<f32, RecordError> {
    let value = f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RecordError::InvalidField {
            field,
            value: value.to_bits(),
        })
    }
}

fn read_bool(bytes: &[u8], at: usize, field: &'static str) -> Result<bool, RecordError> {
    match bytes[at] {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RecordError::InvalidField {
            field,
            value: other as u32,
        }),
    }
}

fn read_owner(bytes: &[u8]) -> Result<PlayerId, RecordError> {
    match bytes[1] {
        0 => Err(RecordError::InvalidField {
            field: "owner",
            value: 0,
        }),
        id => Ok(PlayerId(id)),
    }
}

/// Length and version checks shared by every record.
fn check_header(bytes: &[u8], expected: usize) -> Result<(), RecordError> {
    if bytes.len() < expected {
        return Err(RecordError::Truncated {
            expected,
            found: bytes.len(),
        });
    }
    let found = bytes[0];
    if found == 0 || found > RECORD_VERSION {
        return Err(RecordError::UnsupportedVersion {
            found,
            supported: RECORD_VERSION,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Producer
// ---------------------------------------------------------------------------

pub fn encode_producer<K: NetworkKind>(
    producer: &Producer<K>,
) -> Result<[u8; PRODUCER_RECORD_SIZE], RecordError> {
    let mut out = [0u8; PRODUCER_RECORD_SIZE];
    out[0] = RECORD_VERSION;
    out[1] = producer.owner.0;
    out[2..4].copy_from_slice(&write_u16(producer.grid_x as u64, "grid_x")?);
    out[4..6].copy_from_slice(&write_u16(producer.grid_y as u64, "grid_y")?);
    out[6..10].copy_from_slice(&producer.base_output.to_le_bytes());
    out[10..14].copy_from_slice(&producer.efficiency.to_le_bytes());
    out[14..18].copy_from_slice(&producer.condition.to_le_bytes());
    out[18..20].copy_from_slice(&write_u16(producer.coverage_radius.into(), "coverage_radius")?);
    out[20] = producer.online as u8;
    out[21] = producer.source.code();
    Ok(out)
}

/// `current_output` is recomputed from the stored factors.
pub fn decode_producer<K: NetworkKind>(bytes: &[u8]) -> Result<Producer<K>, RecordError> {
    check_header(bytes, PRODUCER_RECORD_SIZE)?;
    let owner = read_owner(bytes)?;
    let source = K::Source::from_code(bytes[21]).ok_or(RecordError::InvalidField {
        field: "source",
        value: bytes[21] as u32,
    })?;
    let mut producer = Producer::<K>::new(
        source,
        owner,
        read_u16(bytes, 2) as usize,
        read_u16(bytes, 4) as usize,
        read_f32(bytes, 6, "base_output")?,
        read_u16(bytes, 18) as u32,
    );
    producer.efficiency = read_f32(bytes, 10, "efficiency")?;
    producer.condition = read_f32(bytes, 14, "condition")?;
    producer.online = read_bool(bytes, 20, "online")?;
    producer.refresh_output();
    Ok(producer)
}

// ---------------------------------------------------------------------------
// Conduit
// ---------------------------------------------------------------------------

pub fn encode_conduit<K: NetworkKind>(
    conduit: &Conduit<K>,
) -> Result<[u8; CONDUIT_RECORD_SIZE], RecordError> {
    let mut out = [0u8; CONDUIT_RECORD_SIZE];
    out[0] = RECORD_VERSION;
    out[1] = conduit.owner.0;
    out[2..4].copy_from_slice(&write_u16(conduit.grid_x as u64, "grid_x")?);
    out[4..6].copy_from_slice(&write_u16(conduit.grid_y as u64, "grid_y")?);
    out[6..8].copy_from_slice(&write_u16(conduit.coverage_radius.into(), "coverage_radius")?);
    Ok(out)
}

pub fn decode_conduit<K: NetworkKind>(bytes: &[u8]) -> Result<Conduit<K>, RecordError> {
    check_header(bytes, CONDUIT_RECORD_SIZE)?;
    Ok(Conduit::new(
        read_owner(bytes)?,
        read_u16(bytes, 2) as usize,
        read_u16(bytes, 4) as usize,
        read_u16(bytes, 6) as u32,
    ))
}

// ---------------------------------------------------------------------------
// Consumer
// ---------------------------------------------------------------------------

pub fn encode_consumer<K: NetworkKind>(
    consumer: &Consumer<K>,
) -> Result<[u8; CONSUMER_RECORD_SIZE], RecordError> {
    let mut out = [0u8; CONSUMER_RECORD_SIZE];
    out[0] = RECORD_VERSION;
    out[1] = consumer.owner.0;
    out[2..4].copy_from_slice(&write_u16(consumer.grid_x as u64, "grid_x")?);
    out[4..6].copy_from_slice(&write_u16(consumer.grid_y as u64, "grid_y")?);
    out[6..10].copy_from_slice(&consumer.required.to_le_bytes());
    out[10..14].copy_from_slice(&consumer.received.to_le_bytes());
    out[14] = consumer.priority.rank();
    out[15] = consumer.satisfied as u8;
    Ok(out)
}

pub fn decode_consumer<K: NetworkKind>(bytes: &[u8]) -> Result<Consumer<K>, RecordError> {
    check_header(bytes, CONSUMER_RECORD_SIZE)?;
    let priority = LoadPriority::from_rank(bytes[14]).ok_or(RecordError::InvalidField {
        field: "priority",
        value: bytes[14] as u32,
    })?;
    let mut consumer = Consumer::<K>::new(
        read_owner(bytes)?,
        read_u16(bytes, 2) as usize,
        read_u16(bytes, 4) as usize,
        read_f32(bytes, 6, "required")?,
        priority,
    );
    consumer.received = read_f32(bytes, 10, "received")?;
    consumer.satisfied = read_bool(bytes, 15, "satisfied")?;
    Ok(consumer)
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

pub fn encode_pool(pool: &PoolSnapshot) -> [u8; POOL_RECORD_SIZE] {
    let mut out = [0u8; POOL_RECORD_SIZE];
    out[0] = RECORD_VERSION;
    out[1] = pool.state.code();
    out[2] = pool.previous_state.code();
    out[4..8].copy_from_slice(&pool.total_generated.to_le_bytes());
    out[8..12].copy_from_slice(&pool.total_consumed.to_le_bytes());
    out[12..16].copy_from_slice(&pool.surplus.to_le_bytes());
    out[16..20].copy_from_slice(&pool.producer_count.to_le_bytes());
    out[20..24].copy_from_slice(&pool.consumer_count.to_le_bytes());
    out
}

pub fn decode_pool(bytes: &[u8]) -> Result<PoolSnapshot, RecordError> {
    check_header(bytes, POOL_RECORD_SIZE)?;
    let state_code = |at: usize, field: &'static str| {
        PoolState::from_code(bytes[at]).ok_or(RecordError::InvalidField {
            field,
            value: bytes[at] as u32,
        })
    };
    Ok(PoolSnapshot {
        total_generated: read_f32(bytes, 4, "total_generated")?,
        total_consumed: read_f32(bytes, 8, "total_consumed")?,
        surplus: read_f32(bytes, 12, "surplus")?,
        producer_count: read_u32(bytes, 16),
        consumer_count: read_u32(bytes, 20),
        state: state_code(1, "state")?,
        previous_state: state_code(2, "previous_state")?,
    })
}

/// All of a network's pools, players ascending.
pub fn encode_pools<K: NetworkKind>(state: &NetworkState<K>) -> Vec<u8> {
    let mut out = Vec::with_capacity(state.max_players() as usize * POOL_RECORD_SIZE);
    for player in PlayerId::all(state.max_players()) {
        out.extend_from_slice(&encode_pool(&state.pool(player)));
    }
    out
}

pub fn decode_pools(bytes: &[u8]) -> Result<Vec<PoolSnapshot>, RecordError> {
    let whole = bytes.len() / POOL_RECORD_SIZE * POOL_RECORD_SIZE;
    if whole != bytes.len() {
        return Err(RecordError::Truncated {
            expected: whole + POOL_RECORD_SIZE,
            found: bytes.len(),
        });
    }
    bytes.chunks_exact(POOL_RECORD_SIZE).map(decode_pool).collect()
}

// ---------------------------------------------------------------------------
// Restore
// ---------------------------------------------------------------------------

/// Rebuild network `K`'s state from the components present in `world` after
/// a load. `pools` holds the saved pools in player order (may be empty).
///
/// Registration follows entity order so the result does not depend on query
/// iteration. Every player is marked dirty; coverage and conduit flags are
/// recomputed on the next tick. Returns the number of entities registered.
pub fn restore_network<K: NetworkKind>(world: &mut World, pools: &[PoolSnapshot]) -> usize {
    let mut producers: Vec<(Entity, Producer<K>)> = world
        .query::<(Entity, &Producer<K>)>()
        .iter(world)
        .map(|(e, p)| (e, p.clone()))
        .collect();
    producers.sort_by_key(|(e, _)| *e);
    let mut conduits: Vec<(Entity, Conduit<K>)> = world
        .query::<(Entity, &Conduit<K>)>()
        .iter(world)
        .map(|(e, c)| (e, c.clone()))
        .collect();
    conduits.sort_by_key(|(e, _)| *e);
    let mut consumers: Vec<(Entity, Consumer<K>)> = world
        .query::<(Entity, &Consumer<K>)>()
        .iter(world)
        .map(|(e, c)| (e, c.clone()))
        .collect();
    consumers.sort_by_key(|(e, _)| *e);

    let mut state = world.get_resource_or_insert_with(NetworkState::<K>::default);
    state.reset();

    let mut registered = 0;
    let mut report = |entity: Entity, result: Result<(), crate::placement::PlacementError>| match result {
        Ok(()) => registered += 1,
        Err(err) => warn!(
            "{} network: skipped loaded entity {:?}: {}",
            K::LABEL.name(),
            entity,
            err
        ),
    };
    for (entity, producer) in &producers {
        report(*entity, state.register_producer(*entity, producer));
    }
    for (entity, conduit) in &conduits {
        report(*entity, state.register_conduit(*entity, conduit));
    }
    for (entity, consumer) in &consumers {
        report(*entity, state.register_consumer(*entity, consumer));
        state.seed_satisfied(*entity, consumer.satisfied);
    }

    for (player, pool) in PlayerId::all(state.max_players()).zip(pools.iter()) {
        state.restore_pool(player, *pool);
    }
    state.mark_all_dirty();
    registered
}
