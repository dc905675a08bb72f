//! Grid coordinate types and building footprints.
//!
//! The transport world is a 2-D integer grid.  `CellCoord` is the node key
//! for the road graph; `i32` components allow worlds centred on the origin
//! with negative coordinates (the grid grows in every direction as the city
//! expands).

use std::fmt;

// ── CellCoord ─────────────────────────────────────────────────────────────────

/// An integer `(x, z)` grid coordinate.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

impl CellCoord {
    #[inline]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The cell one step away in `dir`.
    #[inline]
    pub fn step(self, dir: Direction) -> CellCoord {
        let (dx, dz) = dir.offset();
        CellCoord::new(self.x + dx, self.z + dz)
    }

    /// The four orthogonal neighbors in fixed N/E/S/W order.
    ///
    /// The fixed order matters: breadth-first expansions iterate it directly,
    /// so identical inputs always visit cells in the same sequence.
    #[inline]
    pub fn orthogonal_neighbors(self) -> [CellCoord; 4] {
        [
            self.step(Direction::North),
            self.step(Direction::East),
            self.step(Direction::South),
            self.step(Direction::West),
        ]
    }

    /// Manhattan (hop-count lower bound) distance to `other`.
    #[inline]
    pub fn manhattan(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }

    /// `true` if `other` is exactly one orthogonal step away.
    #[inline]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan(other) == 1
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

// ── Direction ─────────────────────────────────────────────────────────────────

/// One of the four orthogonal grid directions.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Grid offset for one step in this direction.  North is `-z`.
    #[inline]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    /// Direction of the single step from `from` to `to`, if they are adjacent.
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|&d| from.step(d) == to)
    }
}

// ── Rotation ──────────────────────────────────────────────────────────────────

/// Quarter-turn rotation of a building footprint.
///
/// `R90` and `R270` swap the footprint's size axes; the root cell stays the
/// minimum corner regardless of rotation, so footprint scans never need
/// per-rotation offset tables.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// `true` if this rotation swaps the width/depth axes.
    #[inline]
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Rotation::R90 | Rotation::R270)
    }
}

// ── Footprint ─────────────────────────────────────────────────────────────────

/// The grid-aligned rectangle occupied by a building.
///
/// `root` is the minimum corner, `size` is `(width, depth)` before rotation.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Footprint {
    pub root: CellCoord,
    pub size: (u32, u32),
    pub rotation: Rotation,
}

impl Footprint {
    pub fn new(root: CellCoord, width: u32, depth: u32, rotation: Rotation) -> Self {
        Self { root, size: (width, depth), rotation }
    }

    /// Single-cell footprint, the common case for small service buildings.
    pub fn single(cell: CellCoord) -> Self {
        Self::new(cell, 1, 1, Rotation::R0)
    }

    /// Rotation-adjusted `(width, depth)` extent on the grid.
    #[inline]
    pub fn extent(&self) -> (u32, u32) {
        if self.rotation.swaps_axes() {
            (self.size.1, self.size.0)
        } else {
            self.size
        }
    }

    /// `true` if `cell` lies inside the footprint rectangle.
    pub fn contains(&self, cell: CellCoord) -> bool {
        let (w, d) = self.extent();
        cell.x >= self.root.x
            && cell.z >= self.root.z
            && cell.x < self.root.x + w as i32
            && cell.z < self.root.z + d as i32
    }

    /// All cells covered by the footprint, row-major from the root.
    pub fn cells(&self) -> Vec<CellCoord> {
        let (w, d) = self.extent();
        let mut out = Vec::with_capacity((w * d) as usize);
        for z in 0..d as i32 {
            for x in 0..w as i32 {
                out.push(CellCoord::new(self.root.x + x, self.root.z + z));
            }
        }
        out
    }

    /// The ring of cells orthogonally adjacent to the footprint edge.
    ///
    /// Diagonal corner cells are excluded: a road touching only a corner does
    /// not give vehicle access to the building.
    pub fn perimeter(&self) -> Vec<CellCoord> {
        let (w, d) = self.extent();
        let (w, d) = (w as i32, d as i32);
        let mut out = Vec::with_capacity(2 * (w + d) as usize);
        for x in 0..w {
            out.push(CellCoord::new(self.root.x + x, self.root.z - 1));
            out.push(CellCoord::new(self.root.x + x, self.root.z + d));
        }
        for z in 0..d {
            out.push(CellCoord::new(self.root.x - 1, self.root.z + z));
            out.push(CellCoord::new(self.root.x + w, self.root.z + z));
        }
        out
    }

    /// The cell nearest the rectangle centre (rounded toward the root).
    pub fn center(&self) -> CellCoord {
        let (w, d) = self.extent();
        CellCoord::new(
            self.root.x + (w as i32 - 1) / 2,
            self.root.z + (d as i32 - 1) / 2,
        )
    }
}
