//! Path queries over the road graph: multi-source BFS distances, exact path
//! reconstruction, and footprint road-access discovery.
//!
//! All hop counts are unweighted — the road speed multiplier affects travel
//! *time* (handled by the hauler's movement), never route *choice* here.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::warn;

use haul_core::{CellCoord, Footprint};

use crate::network::RoadGraph;

// ── Multi-source BFS ──────────────────────────────────────────────────────────

/// Shortest hop count from the nearest of `sources` to every reachable cell
/// within `max_steps`.
///
/// Cells farther than `max_steps` — or not on the network at all — are simply
/// absent from the result; there is no sentinel distance.  Sources that are
/// not network cells contribute nothing; duplicates are harmless.
pub fn distances(
    graph: &RoadGraph,
    sources: &[CellCoord],
    max_steps: u32,
) -> FxHashMap<CellCoord, u32> {
    let mut dist: FxHashMap<CellCoord, u32> = FxHashMap::default();
    let mut frontier: VecDeque<CellCoord> = VecDeque::new();

    for &src in sources {
        if graph.contains(src) && !dist.contains_key(&src) {
            dist.insert(src, 0);
            frontier.push_back(src);
        }
    }

    while let Some(cell) = frontier.pop_front() {
        let d = dist[&cell];
        if d >= max_steps {
            continue; // frontier reached the horizon; don't expand further
        }
        for neighbor in graph.neighbors(cell) {
            if !dist.contains_key(&neighbor) {
                dist.insert(neighbor, d + 1);
                frontier.push_back(neighbor);
            }
        }
    }
    dist
}

// ── Exact path reconstruction ─────────────────────────────────────────────────

/// Shortest path from `start` to `goal` (inclusive of both), or `None` when
/// disconnected.
///
/// The rewind from `goal` is cycle-guarded: a revisited cell or more than
/// `step_ceiling` steps means the predecessor map is inconsistent, which is
/// logged and treated as "no path" rather than looping forever.
pub fn reconstruct_path(
    graph: &RoadGraph,
    start: CellCoord,
    goal: CellCoord,
    step_ceiling: u32,
) -> Option<Vec<CellCoord>> {
    if !graph.contains(start) || !graph.contains(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    // Forward BFS recording each cell's predecessor.
    let mut prev: FxHashMap<CellCoord, CellCoord> = FxHashMap::default();
    let mut frontier: VecDeque<CellCoord> = VecDeque::new();
    prev.insert(start, start);
    frontier.push_back(start);

    'search: while let Some(cell) = frontier.pop_front() {
        for neighbor in graph.neighbors(cell) {
            if !prev.contains_key(&neighbor) {
                prev.insert(neighbor, cell);
                if neighbor == goal {
                    break 'search;
                }
                frontier.push_back(neighbor);
            }
        }
    }

    if !prev.contains_key(&goal) {
        return None; // disconnected
    }

    // Rewind, guarding against cycles and runaway chains.
    let mut path = Vec::new();
    let mut seen: FxHashSet<CellCoord> = FxHashSet::default();
    let mut cur = goal;
    let mut steps = 0u32;
    loop {
        if !seen.insert(cur) {
            warn!(cell = %cur, "predecessor cycle during path rewind; dropping path");
            return None;
        }
        if steps > step_ceiling {
            warn!(
                start = %start,
                goal = %goal,
                ceiling = step_ceiling,
                "path rewind exceeded step ceiling; dropping path"
            );
            return None;
        }
        path.push(cur);
        if cur == start {
            break;
        }
        cur = prev[&cur];
        steps += 1;
    }
    path.reverse();
    Some(path)
}

// ── Road-access discovery ─────────────────────────────────────────────────────

/// Network cells adjoining `footprint`, for use as path sources/targets.
///
/// First scans the footprint perimeter (edge-adjacent, no corners).  When
/// the building has no direct road frontage, falls back to expanding square
/// rings of radius `2..=max_radius` and returns the first nonempty ring —
/// a courier can cross a short stretch of open ground to the nearest road.
///
/// Results are sorted so callers see a deterministic order.
pub fn road_access_cells(
    graph: &RoadGraph,
    footprint: &Footprint,
    max_radius: u32,
) -> Vec<CellCoord> {
    let mut access: Vec<CellCoord> = footprint
        .perimeter()
        .into_iter()
        .filter(|&c| graph.contains(c))
        .collect();

    let mut radius = 2;
    while access.is_empty() && radius <= max_radius {
        access = ring_cells(footprint, radius)
            .into_iter()
            .filter(|&c| graph.contains(c))
            .collect();
        radius += 1;
    }

    access.sort_unstable();
    access.dedup();
    access
}

/// The square ring of cells at Chebyshev distance `radius` around the
/// footprint rectangle (corners included — at radius ≥ 2 the walk to the
/// road is off-grid anyway, so diagonal adjacency is fine).
fn ring_cells(footprint: &Footprint, radius: u32) -> Vec<CellCoord> {
    let (w, d) = footprint.extent();
    let r = radius as i32;
    let min_x = footprint.root.x - r;
    let min_z = footprint.root.z - r;
    let max_x = footprint.root.x + w as i32 - 1 + r;
    let max_z = footprint.root.z + d as i32 - 1 + r;

    let mut out = Vec::with_capacity((2 * (max_x - min_x + max_z - min_z)) as usize);
    for x in min_x..=max_x {
        out.push(CellCoord::new(x, min_z));
        out.push(CellCoord::new(x, max_z));
    }
    for z in (min_z + 1)..max_z {
        out.push(CellCoord::new(min_x, z));
        out.push(CellCoord::new(max_x, z));
    }
    out
}
