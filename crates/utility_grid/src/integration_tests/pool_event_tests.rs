//! Pool classification, rationing and the published event stream.

use crate::components::LoadPriority;
use crate::events::{UtilityEvent, UtilityEventKind};
use crate::network_kind::NetworkLabel;
use crate::player::PlayerId;
use crate::pool::PoolState;

use super::small_grid;

fn pool_events(events: &[UtilityEvent]) -> Vec<UtilityEventKind> {
    events
        .iter()
        .filter(|e| e.kind.is_pool_event())
        .map(|e| e.kind)
        .collect()
}

#[test]
fn test_healthy_deficit_healthy_emits_one_begin_and_one_end() {
    let mut grid = small_grid();
    let plant = grid.power_plant(1, (10, 10), 100.0, 5);
    grid.building(1, (11, 11), 50.0, LoadPriority::Normal);

    grid.tick(1);
    assert_eq!(grid.pool(1).state, PoolState::Healthy);
    assert!(pool_events(&grid.drain_events()).is_empty());

    grid.set_output(plant, 40.0);
    grid.tick(1);
    assert_eq!(grid.pool(1).state, PoolState::Deficit);
    let events = grid.drain_events();
    assert_eq!(pool_events(&events), vec![UtilityEventKind::DeficitBegan]);
    let began = events
        .iter()
        .find(|e| e.kind == UtilityEventKind::DeficitBegan)
        .unwrap();
    assert_eq!(began.tick, 2);
    assert_eq!(began.player, PlayerId(1));
    assert_eq!(began.network, NetworkLabel::Energy);

    grid.set_output(plant, 100.0);
    grid.tick(1);
    assert_eq!(grid.pool(1).state, PoolState::Healthy);
    assert_eq!(pool_events(&grid.drain_events()), vec![UtilityEventKind::DeficitEnded]);

    grid.tick(2);
    assert!(pool_events(&grid.drain_events()).is_empty());
}

#[test]
fn test_consumer_flips_reported_once() {
    let mut grid = small_grid();
    let plant = grid.power_plant(1, (10, 10), 100.0, 5);
    let house = grid.building(1, (11, 11), 60.0, LoadPriority::Normal);

    grid.tick(1);
    let events = grid.drain_events();
    assert_eq!(
        events.iter().map(|e| e.kind).collect::<Vec<_>>(),
        vec![UtilityEventKind::ConsumerStateChanged {
            entity: house,
            was: false,
            now: true
        }]
    );

    grid.tick(3);
    assert!(grid.drain_events().is_empty());

    grid.set_output(plant, 10.0);
    grid.tick(1);
    let kinds: Vec<UtilityEventKind> = grid.drain_events().iter().map(|e| e.kind).collect();
    // Pool edges come before consumer flips.
    assert_eq!(
        kinds,
        vec![
            UtilityEventKind::DeficitBegan,
            UtilityEventKind::CollapseBegan,
            UtilityEventKind::ConsumerStateChanged {
                entity: house,
                was: true,
                now: false
            },
        ]
    );
}

#[test]
fn test_deficit_rations_by_priority() {
    let mut grid = small_grid();
    grid.power_plant(1, (10, 10), 100.0, 6);
    let hospital = grid.building(1, (11, 10), 60.0, LoadPriority::Critical);
    let shop = grid.building(1, (12, 10), 30.0, LoadPriority::Normal);
    let park = grid.building(1, (13, 10), 30.0, LoadPriority::Low);

    grid.tick(1);

    let pool = grid.pool(1);
    assert_eq!(pool.state, PoolState::Deficit);
    assert_eq!(pool.surplus, -20.0);
    assert!(grid.is_satisfied(hospital));
    assert!(grid.is_satisfied(shop));
    assert!(!grid.is_satisfied(park));
    assert_eq!(grid.consumer(park).received, 0.0);
}

#[test]
fn test_offline_producer_drops_coverage_and_supply() {
    let mut grid = small_grid();
    let plant = grid.power_plant(1, (10, 10), 100.0, 4);
    let line = grid.power_line(1, (12, 10), 3);
    let house = grid.building(1, (14, 10), 10.0, LoadPriority::Normal);
    grid.tick(1);
    assert!(grid.is_satisfied(house));

    grid.set_online(plant, false);
    grid.tick(1);
    assert!(!grid.conduit(line).is_connected);
    assert!(!grid.is_satisfied(house));
    let pool = grid.pool(1);
    assert_eq!(pool.total_generated, 0.0);
    assert_eq!(pool.producer_count, 0);
    // Nothing is covered, so nothing is demanded.
    assert_eq!(pool.state, PoolState::Healthy);

    grid.set_online(plant, true);
    grid.tick(1);
    assert!(grid.conduit(line).is_connected);
    assert!(grid.is_satisfied(house));
}

#[test]
fn test_params_resource_drives_classification() {
    let params = crate::config::UtilityParams {
        buffer_threshold_percent: 0.5,
        ..Default::default()
    };
    let mut grid = small_grid().with_params(params);
    grid.power_plant(1, (10, 10), 100.0, 4);
    grid.building(1, (11, 10), 60.0, LoadPriority::Normal);

    grid.tick(1);
    assert_eq!(grid.pool(1).state, PoolState::Marginal);
}
