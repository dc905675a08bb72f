//! Incremental road network graph.
//!
//! # Data layout
//!
//! Adjacency is a hash map from cell to a fixed `[Option<CellCoord>; 4]`
//! array indexed by [`Direction`] order (N/E/S/W).  A CSR layout would be
//! more compact, but this graph changes every time the player lays or
//! bulldozes a segment; per-cell arrays give O(1) incremental updates with
//! no rebuild, and the full [`rebuild`](RoadGraph::rebuild) path exists for
//! recovery when incremental updates were missed (e.g. after a bulk load).
//!
//! # Invariant
//!
//! Edge (A, B) exists iff both A and B carry a segment and are orthogonally
//! adjacent — and it is always symmetric.  Every mutation path below
//! maintains both directions together.

use rustc_hash::FxHashMap;

use haul_core::{CellCoord, Direction};
use haul_world::GridMap;

/// A change notification emitted by the graph.
///
/// Consumers (routing caches, UI overlays) poll [`RoadGraph::drain_events`]
/// once per tick rather than registering callbacks; nothing happens between
/// ticks, so polling loses no information.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RoadEvent {
    /// A segment was added at the cell.
    Added(CellCoord),
    /// A segment was removed at the cell.
    Removed(CellCoord),
    /// The whole graph was rebuilt; all derived caches are stale.
    Rebuilt,
}

/// Adjacency structure over transport cells (undirected, 4-connected).
#[derive(Default)]
pub struct RoadGraph {
    adj: FxHashMap<CellCoord, [Option<CellCoord>; 4]>,
    events: Vec<RoadEvent>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.adj.contains_key(&cell)
    }

    /// Linked neighbors of `cell` in N/E/S/W order.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        self.adj
            .get(&cell)
            .into_iter()
            .flat_map(|links| links.iter().flatten().copied())
    }

    pub fn degree(&self, cell: CellCoord) -> usize {
        self.adj
            .get(&cell)
            .map_or(0, |links| links.iter().flatten().count())
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adj.is_empty()
    }

    /// Verify the symmetry invariant — every link has its reverse.
    /// Test/diagnostic helper; O(nodes).
    pub fn is_symmetric(&self) -> bool {
        self.adj.iter().all(|(&cell, links)| {
            links.iter().flatten().all(|&n| {
                self.adj
                    .get(&n)
                    .is_some_and(|back| back.contains(&Some(cell)))
            })
        })
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Register a segment at `cell` and link it to already-present orthogonal
    /// neighbors (both directions).  Returns `false` if the node existed.
    pub fn add_segment(&mut self, cell: CellCoord) -> bool {
        if self.adj.contains_key(&cell) {
            return false;
        }
        let mut links = [None; 4];
        for (i, dir) in Direction::ALL.into_iter().enumerate() {
            let neighbor = cell.step(dir);
            if let Some(back) = self.adj.get_mut(&neighbor) {
                links[i] = Some(neighbor);
                back[opposite_index(i)] = Some(cell);
            }
        }
        self.adj.insert(cell, links);
        self.events.push(RoadEvent::Added(cell));
        true
    }

    /// Unlink and delete the segment at `cell`, pruning neighbor edges.
    /// Returns `false` if no node existed there.
    pub fn remove_segment(&mut self, cell: CellCoord) -> bool {
        let Some(links) = self.adj.remove(&cell) else {
            return false;
        };
        for (i, link) in links.into_iter().enumerate() {
            if let Some(neighbor) = link {
                if let Some(back) = self.adj.get_mut(&neighbor) {
                    back[opposite_index(i)] = None;
                }
            }
        }
        self.events.push(RoadEvent::Removed(cell));
        true
    }

    /// Discard everything and rescan the world's road layer.
    ///
    /// Idempotent on an unchanged world.  Emits a single [`RoadEvent::Rebuilt`]
    /// instead of per-cell events.
    pub fn rebuild(&mut self, grid: &GridMap) {
        self.adj.clear();
        for cell in grid.road_cells() {
            let mut links = [None; 4];
            for (i, dir) in Direction::ALL.into_iter().enumerate() {
                let neighbor = cell.step(dir);
                if let Some(back) = self.adj.get_mut(&neighbor) {
                    links[i] = Some(neighbor);
                    back[opposite_index(i)] = Some(cell);
                }
            }
            self.adj.insert(cell, links);
        }
        self.events.push(RoadEvent::Rebuilt);
    }

    // ── Change notifications ──────────────────────────────────────────────

    /// Take all events accumulated since the last drain.
    pub fn drain_events(&mut self) -> Vec<RoadEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }
}

/// Index of the opposite direction in `Direction::ALL` (N↔S, E↔W).
#[inline]
const fn opposite_index(i: usize) -> usize {
    (i + 2) % 4
}
