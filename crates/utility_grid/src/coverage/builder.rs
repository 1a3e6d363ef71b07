use std::collections::{BTreeSet, VecDeque};

use bevy::prelude::*;

use super::grid::{CoverageGrid, UNCOVERED};
use crate::player::PlayerId;
use crate::topology::{GridPos, TopologyStore};

/// Summary of one player's flood fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageOutcome {
    /// Tiles whose owner byte now reads `player`.
    pub covered_tiles: usize,
    pub connected_conduits: usize,
    /// Some reachable tiles are held by a lower player id.
    pub blocked: bool,
    /// Some tiles owned before the rebuild are no longer owned.
    pub released: bool,
    /// Higher player ids that lost tiles to this rebuild, ascending.
    pub displaced: Vec<PlayerId>,
}

/// Recompute `player`'s coverage from its online producers outward through
/// its conduits.
///
/// 1. Clear every tile currently owned by `player`.
/// 2. Mark all of `player`'s conduits as not connected.
/// 3. Seed from each online producer, marking the clamped square inside its radius.
/// 4. Breadth-first: a conduit is connected the first time its tile is
///    covered, and then marks its own radius square.
///
/// Reachability is computed on a private bitmap, so the result never depends
/// on other players' ownership. A reached tile belongs to the lowest player
/// id that reaches it: held tiles of higher ids are taken over (and those
/// players reported as displaced), tiles of lower ids are left alone. Once
/// every dirty player has rebuilt in ascending order, the owner bytes are a
/// function of the topology alone. Safe to call redundantly.
pub fn rebuild_coverage(
    grid: &mut CoverageGrid,
    topology: &mut TopologyStore,
    player: PlayerId,
) -> CoverageOutcome {
    let previous = grid.clear_player(player);
    topology.reset_connected(player);

    let width = grid.width();
    let height = grid.height();
    let mut reach = vec![false; width * height];
    let mut queue: VecDeque<GridPos> = VecDeque::new();
    let mut connected_conduits = 0;

    for (pos, radius) in topology.online_producers(player) {
        connected_conduits += mark_square(
            pos,
            radius,
            (width, height),
            &mut reach,
            topology,
            player,
            &mut queue,
        );
    }

    while let Some(pos) = queue.pop_front() {
        let Some(radius) = topology.conduit_at(pos).map(|n| n.radius) else {
            continue;
        };
        connected_conduits += mark_square(
            pos,
            radius,
            (width, height),
            &mut reach,
            topology,
            player,
            &mut queue,
        );
    }

    let mut covered_tiles = 0;
    let mut blocked = false;
    let mut displaced: BTreeSet<PlayerId> = BTreeSet::new();
    for (owner, reached) in grid.owners_mut().iter_mut().zip(reach.iter()) {
        if !*reached {
            continue;
        }
        if *owner != UNCOVERED && *owner < player.0 {
            blocked = true;
            continue;
        }
        if *owner != UNCOVERED && *owner != player.0 {
            displaced.insert(PlayerId(*owner));
        }
        *owner = player.0;
        covered_tiles += 1;
    }

    let owners = grid.owners();
    let released = previous.iter().any(|&idx| owners[idx] != player.0);

    debug!(
        "coverage rebuilt for player {}: {} tiles, {} conduits connected{}",
        player.0,
        covered_tiles,
        connected_conduits,
        if blocked || !displaced.is_empty() { " (contested)" } else { "" }
    );

    CoverageOutcome {
        covered_tiles,
        connected_conduits,
        blocked,
        released,
        displaced: displaced.into_iter().collect(),
    }
}

/// Mark every tile at Chebyshev distance `< radius` from `center` (the
/// facility's own tile is always covered), clamped to the map. Newly reached
/// tiles holding an unconnected conduit of `player` connect it and enqueue
/// it. Returns the number of conduits connected.
fn mark_square(
    center: GridPos,
    radius: u32,
    (width, height): (usize, usize),
    reach: &mut [bool],
    topology: &mut TopologyStore,
    player: PlayerId,
    queue: &mut VecDeque<GridPos>,
) -> usize {
    let r = radius.saturating_sub(1) as usize;
    let (cx, cy) = center;
    if cx >= width || cy >= height {
        return 0;
    }
    let x0 = cx.saturating_sub(r);
    let y0 = cy.saturating_sub(r);
    let x1 = (cx + r).min(width - 1);
    let y1 = (cy + r).min(height - 1);

    let mut connected = 0;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let idx = y * width + x;
            if reach[idx] {
                continue;
            }
            reach[idx] = true;
            if let Some(node) = topology.conduit_at_mut((x, y)) {
                if node.owner == player && !node.connected {
                    node.connected = true;
                    connected += 1;
                    queue.push_back((x, y));
                }
            }
        }
    }
    connected
}
