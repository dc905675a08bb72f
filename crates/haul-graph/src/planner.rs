//! New-segment planning: propose the cells for a road connecting two points.
//!
//! # Strategy
//!
//! 1. **Zero-search fast path**: if a straight or single-bend path between
//!    the endpoints is unobstructed, return it without touching the search
//!    machinery.  This covers the vast majority of player-drawn roads.
//! 2. **Bounded best-first search** otherwise, restricted to the corridor
//!    formed by the endpoints' bounding box plus a margin.  The cost model
//!    penalises turns and rewards reusing existing road cells and hugging
//!    building walls, so later plans merge onto earlier roads and form
//!    shared trunks instead of parallel duplicates.
//!
//! A hard expansion ceiling guarantees termination; hitting it (or
//! exhausting the corridor) yields `None`, never an error.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;
use tracing::warn;

use haul_core::{CellCoord, PlannerCosts};
use haul_world::GridMap;

use crate::network::RoadGraph;

/// Plan the cells of a new road from `start` to `goal` (both inclusive).
///
/// Returns `None` when either endpoint is blocked, the corridor is
/// exhausted, or the expansion ceiling is hit.
pub fn plan_segment(
    grid: &GridMap,
    graph: &RoadGraph,
    start: CellCoord,
    goal: CellCoord,
    costs: &PlannerCosts,
) -> Option<Vec<CellCoord>> {
    if !grid.is_road_buildable(start) || !grid.is_road_buildable(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    if let Some(path) = zero_search_path(grid, start, goal) {
        return Some(path);
    }
    best_first(grid, graph, start, goal, costs)
}

// ── Zero-search fast path ─────────────────────────────────────────────────────

/// Straight line or single-bend L, if every cell is buildable.
fn zero_search_path(grid: &GridMap, start: CellCoord, goal: CellCoord) -> Option<Vec<CellCoord>> {
    if start.x == goal.x || start.z == goal.z {
        let path = axis_cells(start, goal);
        if path.iter().all(|&c| grid.is_road_buildable(c)) {
            return Some(path);
        }
        return None;
    }

    // Two L candidates; try the horizontal-first corner, then vertical-first.
    for corner in [
        CellCoord::new(goal.x, start.z),
        CellCoord::new(start.x, goal.z),
    ] {
        let mut path = axis_cells(start, corner);
        let second = axis_cells(corner, goal);
        path.extend_from_slice(&second[1..]); // corner appears once
        if path.iter().all(|&c| grid.is_road_buildable(c)) {
            return Some(path);
        }
    }
    None
}

/// Inclusive cells along one axis between two aligned coordinates.
fn axis_cells(from: CellCoord, to: CellCoord) -> Vec<CellCoord> {
    debug_assert!(from.x == to.x || from.z == to.z);
    let mut out = Vec::with_capacity(from.manhattan(to) as usize + 1);
    if from.x == to.x {
        let step = if to.z >= from.z { 1 } else { -1 };
        let mut z = from.z;
        loop {
            out.push(CellCoord::new(from.x, z));
            if z == to.z {
                break;
            }
            z += step;
        }
    } else {
        let step = if to.x >= from.x { 1 } else { -1 };
        let mut x = from.x;
        loop {
            out.push(CellCoord::new(x, from.z));
            if x == to.x {
                break;
            }
            x += step;
        }
    }
    out
}

// ── Best-first corridor search ────────────────────────────────────────────────

/// Search state: a cell plus the direction it was entered from.
/// Direction is part of the state so the turn penalty is exact (two routes
/// into the same cell from different directions have different futures).
type State = (CellCoord, u8);

/// Sentinel "no incoming direction" for the start state.
const NO_DIR: u8 = 4;

fn best_first(
    grid: &GridMap,
    graph: &RoadGraph,
    start: CellCoord,
    goal: CellCoord,
    costs: &PlannerCosts,
) -> Option<Vec<CellCoord>> {
    let margin = costs.corridor_margin as i32;
    let min_x = start.x.min(goal.x) - margin;
    let max_x = start.x.max(goal.x) + margin;
    let min_z = start.z.min(goal.z) - margin;
    let max_z = start.z.max(goal.z) + margin;
    let in_corridor =
        |c: CellCoord| c.x >= min_x && c.x <= max_x && c.z >= min_z && c.z <= max_z;

    // The cheapest possible per-cell cost, for an admissible distance bound.
    let min_step = costs
        .step_cost
        .saturating_sub(costs.road_reuse_bonus + costs.wall_hug_bonus)
        .max(1);

    let mut best: FxHashMap<State, u32> = FxHashMap::default();
    let mut prev: FxHashMap<State, State> = FxHashMap::default();
    // Min-heap on (bound, g, state); the state components give deterministic
    // tie-breaking.
    let mut heap: BinaryHeap<Reverse<(u32, u32, CellCoord, u8)>> = BinaryHeap::new();

    let start_state: State = (start, NO_DIR);
    best.insert(start_state, 0);
    heap.push(Reverse((start.manhattan(goal) * min_step, 0, start, NO_DIR)));

    let mut expansions = 0u32;

    while let Some(Reverse((_, g, cell, dir))) = heap.pop() {
        if cell == goal {
            return Some(rewind(&prev, (cell, dir), start));
        }
        if g > best.get(&(cell, dir)).copied().unwrap_or(u32::MAX) {
            continue; // stale heap entry
        }

        expansions += 1;
        if expansions > costs.expansion_ceiling {
            warn!(
                %start, %goal,
                ceiling = costs.expansion_ceiling,
                "segment planner hit expansion ceiling"
            );
            return None;
        }

        for (i, next) in cell.orthogonal_neighbors().into_iter().enumerate() {
            if !in_corridor(next) || !grid.is_road_buildable(next) {
                continue;
            }
            let mut step = costs.step_cost;
            if dir != NO_DIR && dir != i as u8 {
                step += costs.turn_penalty;
            }
            if graph.contains(next) {
                step = step.saturating_sub(costs.road_reuse_bonus);
            }
            if hugs_wall(grid, next) {
                step = step.saturating_sub(costs.wall_hug_bonus);
            }
            let ng = g + step.max(1);

            let state: State = (next, i as u8);
            if ng < best.get(&state).copied().unwrap_or(u32::MAX) {
                best.insert(state, ng);
                prev.insert(state, (cell, dir));
                heap.push(Reverse((
                    ng + next.manhattan(goal) * min_step,
                    ng,
                    next,
                    i as u8,
                )));
            }
        }
    }
    None // corridor exhausted
}

/// `true` if `cell` is orthogonally adjacent to at least one building cell.
#[inline]
fn hugs_wall(grid: &GridMap, cell: CellCoord) -> bool {
    cell.orthogonal_neighbors()
        .into_iter()
        .any(|n| grid.is_occupied(n))
}

fn rewind(prev: &FxHashMap<State, State>, end: State, start: CellCoord) -> Vec<CellCoord> {
    let mut path = vec![end.0];
    let mut cur = end;
    while cur.0 != start || cur.1 != NO_DIR {
        cur = prev[&cur];
        path.push(cur.0);
    }
    path.reverse();
    path
}
