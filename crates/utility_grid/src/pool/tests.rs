use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::*;
use crate::components::LoadPriority;
use crate::config::UtilityParams;
use crate::coverage::CoverageGrid;
use crate::player::PlayerId;

const P1: PlayerId = PlayerId(1);
const P2: PlayerId = PlayerId(2);

fn cover(grid: &mut CoverageGrid, x: usize, y: usize, player: PlayerId) {
    let idx = grid.index(x, y);
    grid.owners_mut()[idx] = player.0;
}

fn producer(id: u32, owner: PlayerId, output: f32, online: bool) -> ProducerSample {
    ProducerSample {
        entity: Entity::from_raw(id),
        owner,
        output,
        online,
        storage: 0.0,
    }
}

fn consumer(id: u32, owner: PlayerId, pos: (usize, usize), required: f32) -> ConsumerSlot {
    ConsumerSlot::new(Entity::from_raw(id), owner, pos, required, LoadPriority::Normal)
}

// ====================================================================
// Classification boundaries
// ====================================================================

#[test]
fn test_buffer_boundary_marginal() {
    let params = UtilityParams::default();
    assert_eq!(classify(100.0, 91.0, &params), PoolState::Marginal);
}

#[test]
fn test_buffer_boundary_healthy() {
    let params = UtilityParams::default();
    assert_eq!(classify(100.0, 89.0, &params), PoolState::Healthy);
}

#[test]
fn test_collapse_floor_is_exclusive() {
    let params = UtilityParams::default();
    assert_eq!(classify(50.0, 100.0, &params), PoolState::Collapse);
    assert_eq!(classify(50.0, 99.0, &params), PoolState::Deficit);
}

#[test]
fn test_empty_pool_is_healthy() {
    let params = UtilityParams::default();
    assert_eq!(classify(0.0, 0.0, &params), PoolState::Healthy);
}

#[test]
fn test_zero_generation_skips_marginal() {
    let params = UtilityParams::default();
    assert_eq!(classify(0.0, 10.0, &params), PoolState::Collapse);
    assert_eq!(classify(9.0, 10.0, &params), PoolState::Deficit);
}

#[test]
fn test_exact_balance_is_marginal() {
    let params = UtilityParams::default();
    assert_eq!(classify(100.0, 100.0, &params), PoolState::Marginal);
}

#[test]
fn test_custom_thresholds() {
    let params = UtilityParams {
        buffer_threshold_percent: 0.0,
        collapse_threshold_percent: 1.0,
        ..Default::default()
    };
    assert_eq!(classify(100.0, 100.0, &params), PoolState::Healthy);
    assert_eq!(classify(10.0, 100.0, &params), PoolState::Deficit);
}

#[test]
fn test_snapshot_classify_tracks_previous() {
    let params = UtilityParams::default();
    let mut snap = PoolSnapshot::new(10.0, 50.0, 1, 2);
    snap.classify(PoolState::Healthy, &params);
    assert_eq!(snap.state, PoolState::Collapse);
    assert_eq!(snap.previous_state, PoolState::Healthy);
    assert!(snap.transitioned());
}

#[test]
fn test_state_codes_roundtrip() {
    for code in 0..4u8 {
        assert_eq!(PoolState::from_code(code).unwrap().code(), code);
    }
    assert!(PoolState::from_code(4).is_none());
}

// ====================================================================
// Aggregation
// ====================================================================

#[test]
fn test_aggregate_counts_only_online_producers() {
    let grid = CoverageGrid::new(16, 16);
    let producers = vec![
        producer(1, P1, 60.0, true),
        producer(2, P1, 40.0, false),
        producer(3, P2, 500.0, true),
    ];
    let snap = aggregate(P1, &producers, &[], &grid);
    assert_eq!(snap.total_generated, 60.0);
    assert_eq!(snap.producer_count, 1);
}

#[test]
fn test_aggregate_gates_demand_on_coverage() {
    let mut grid = CoverageGrid::new(16, 16);
    cover(&mut grid, 1, 1, P1);
    cover(&mut grid, 2, 1, P2);
    let consumers = vec![
        consumer(10, P1, (1, 1), 25.0),
        consumer(11, P1, (2, 1), 30.0), // covered, but by someone else
        consumer(12, P1, (3, 1), 40.0), // uncovered
    ];
    let snap = aggregate(P1, &[], &consumers, &grid);
    assert_eq!(snap.total_consumed, 25.0);
    assert_eq!(snap.consumer_count, 1);
}

#[test]
fn test_surplus_conservation() {
    let mut grid = CoverageGrid::new(16, 16);
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut consumers = Vec::new();
    for i in 0..40u32 {
        let pos = ((i % 16) as usize, (i / 16) as usize);
        if i % 3 != 0 {
            cover(&mut grid, pos.0, pos.1, P1);
        }
        consumers.push(consumer(100 + i, P1, pos, 1.5 + i as f32 * 0.37));
    }
    let producers: Vec<ProducerSample> = (0..5u32)
        .map(|i| producer(i, P1, 12.25 * (i + 1) as f32, true))
        .collect();

    for _ in 0..4 {
        consumers.shuffle(&mut rng);
        let mut snap = aggregate(P1, &producers, &consumers, &grid);
        assert_eq!(snap.surplus, snap.total_generated - snap.total_consumed);
        snap.add_supply(3.5);
        assert_eq!(snap.surplus, snap.total_generated - snap.total_consumed);
    }
}

#[test]
fn test_aggregate_independent_of_sample_order() {
    let mut grid = CoverageGrid::new(32, 32);
    let mut consumers = Vec::new();
    for i in 0..64u32 {
        let pos = ((i % 32) as usize, (i / 32) as usize);
        cover(&mut grid, pos.0, pos.1, P1);
        consumers.push(consumer(1000 + i, P1, pos, 0.1 * (i + 1) as f32));
    }
    let mut producers: Vec<ProducerSample> = (0..20u32)
        .map(|i| producer(i, P1, 0.7 * (i + 3) as f32, true))
        .collect();

    let reference = aggregate(P1, &producers, &consumers, &grid);
    let mut rng = ChaCha8Rng::seed_from_u64(0xBEEF);
    for _ in 0..8 {
        producers.shuffle(&mut rng);
        consumers.shuffle(&mut rng);
        let snap = aggregate(P1, &producers, &consumers, &grid);
        assert_eq!(snap.total_generated.to_bits(), reference.total_generated.to_bits());
        assert_eq!(snap.total_consumed.to_bits(), reference.total_consumed.to_bits());
    }
}

#[test]
fn test_negative_requirement_clamped() {
    let slot = consumer(1, P1, (0, 0), -5.0);
    assert_eq!(slot.required, 0.0);
}
