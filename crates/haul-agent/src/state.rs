//! Agent state: the haul-cycle state machine, travel legs, and operation
//! timers.

use haul_core::CellCoord;
use haul_world::GridMap;

// ── HaulState ─────────────────────────────────────────────────────────────────

/// The six stages of a haul cycle.  Exactly one is active per agent, and
/// cargo is mutated only while a Loading/Unloading state completes.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HaulState {
    #[default]
    Idle,
    /// Timed withdrawal from the home output pile.
    LoadingOutput,
    /// Travelling toward the delivery target along a precomputed leg.
    DeliveringOutput,
    /// Timed deposit of every non-empty slot into the current target.
    UnloadingOutput,
    /// Timed withdrawal of home-needed inputs at the current location.
    LoadingInput,
    /// Travelling home (or, on a direct fetch, toward the input source).
    ReturningWithInput,
}

// ── Timer ─────────────────────────────────────────────────────────────────────

/// Countdown for a timed operation.  At most one is pending per agent.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timer {
    remaining: u32,
}

impl Timer {
    pub fn new(duration: u32) -> Self {
        Self { remaining: duration }
    }

    /// Advance one tick; `true` once the countdown has elapsed.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }
}

// ── Leg ───────────────────────────────────────────────────────────────────────

/// A precomputed travel leg along road cells.
///
/// The path is frozen at planning time: later road edits do not reroute a leg
/// already underway (the agent finishes on the old path and the next leg sees
/// the new network).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    path: Vec<CellCoord>,
    cursor: usize,
    /// Sub-cell progress toward the next path index, in cells.
    progress: f32,
}

impl Leg {
    /// A leg over `path`, which must be nonempty.
    pub fn new(path: Vec<CellCoord>) -> Self {
        debug_assert!(!path.is_empty());
        Self { path, cursor: 0, progress: 0.0 }
    }

    /// The cell the agent currently occupies.
    pub fn position(&self) -> CellCoord {
        self.path[self.cursor.min(self.path.len() - 1)]
    }

    /// The final cell of the leg.
    pub fn destination(&self) -> CellCoord {
        self.path[self.path.len() - 1]
    }

    pub fn arrived(&self) -> bool {
        self.cursor + 1 >= self.path.len()
    }

    /// Advance by one tick of travel; speed is modulated by the current
    /// cell's road multiplier.  Returns `true` on arrival.
    pub fn advance(&mut self, grid: &GridMap, base_speed: f32) -> bool {
        if self.arrived() {
            return true;
        }
        self.progress += base_speed * grid.speed_multiplier(self.position());
        while self.progress >= 1.0 && !self.arrived() {
            self.progress -= 1.0;
            self.cursor += 1;
        }
        self.arrived()
    }
}
