//! `GridMap` — the world/grid collaborator.
//!
//! Holds the two layers the logistics subsystem reads: building occupancy
//! (which cells a footprint covers, and whose) and the road layer (segment
//! presence plus a per-segment speed multiplier).  The road graph is
//! rebuildable from this map at any time via [`GridMap::road_cells`].

use rustc_hash::FxHashMap;

use haul_core::{CellCoord, EndpointId, Footprint};

use crate::error::{WorldError, WorldResult};

/// Width/height of one grid cell in world units, for the cell-to-world
/// position mapping exposed to hosts that animate haulers.
pub const CELL_SIZE: f32 = 1.0;

/// Cell occupancy and road layers.
#[derive(Default)]
pub struct GridMap {
    /// Building cells → occupying endpoint.
    occupied: FxHashMap<CellCoord, EndpointId>,
    /// Road cells → speed multiplier (1.0 = plain road; higher = paved).
    roads: FxHashMap<CellCoord, f32>,
}

impl GridMap {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Occupancy layer ───────────────────────────────────────────────────

    #[inline]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.occupied.contains_key(&cell)
    }

    /// The endpoint whose footprint covers `cell`, if any.
    #[inline]
    pub fn occupant(&self, cell: CellCoord) -> Option<EndpointId> {
        self.occupied.get(&cell).copied()
    }

    /// Mark every cell of `footprint` as occupied by `id`.
    ///
    /// Fails without side effects if any cell is already occupied or carries
    /// a road.
    pub fn place_footprint(&mut self, footprint: &Footprint, id: EndpointId) -> WorldResult<()> {
        let cells = footprint.cells();
        for &cell in &cells {
            if self.occupied.contains_key(&cell) {
                return Err(WorldError::CellOccupied(cell));
            }
            if self.roads.contains_key(&cell) {
                return Err(WorldError::RoadPresent(cell));
            }
        }
        for cell in cells {
            self.occupied.insert(cell, id);
        }
        Ok(())
    }

    /// Clear every cell of `footprint` (building demolished).
    pub fn clear_footprint(&mut self, footprint: &Footprint) {
        for cell in footprint.cells() {
            self.occupied.remove(&cell);
        }
    }

    // ── Road layer ────────────────────────────────────────────────────────

    #[inline]
    pub fn has_road(&self, cell: CellCoord) -> bool {
        self.roads.contains_key(&cell)
    }

    /// Speed multiplier of the road at `cell`; `1.0` when no segment exists
    /// (haulers stepping off-road, e.g. the final approach to a building,
    /// move at base speed).
    #[inline]
    pub fn speed_multiplier(&self, cell: CellCoord) -> f32 {
        self.roads.get(&cell).copied().unwrap_or(1.0)
    }

    /// Lay a road segment at `cell`.  Re-laying an existing segment just
    /// updates its multiplier (road upgrades).
    pub fn set_road(&mut self, cell: CellCoord, multiplier: f32) -> WorldResult<()> {
        if self.occupied.contains_key(&cell) {
            return Err(WorldError::CellOccupied(cell));
        }
        self.roads.insert(cell, multiplier.max(0.1));
        Ok(())
    }

    /// Remove the segment at `cell`; returns whether one existed.
    pub fn clear_road(&mut self, cell: CellCoord) -> bool {
        self.roads.remove(&cell).is_some()
    }

    /// All road cells, sorted for deterministic graph rebuilds.
    pub fn road_cells(&self) -> Vec<CellCoord> {
        let mut cells: Vec<CellCoord> = self.roads.keys().copied().collect();
        cells.sort_unstable();
        cells
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    /// `true` if a road segment could be laid at `cell` (not under a building).
    #[inline]
    pub fn is_road_buildable(&self, cell: CellCoord) -> bool {
        !self.occupied.contains_key(&cell)
    }

    // ── World-position mapping ────────────────────────────────────────────

    /// Centre of `cell` in world units, for hosts animating hauler movement.
    #[inline]
    pub fn cell_center(cell: CellCoord) -> (f32, f32) {
        (
            (cell.x as f32 + 0.5) * CELL_SIZE,
            (cell.z as f32 + 0.5) * CELL_SIZE,
        )
    }
}
