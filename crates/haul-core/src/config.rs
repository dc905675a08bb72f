//! Logistics configuration.
//!
//! Every tunable of the subsystem lives in one struct so that hosts construct
//! it once, validate it, and pass it by reference to the components that need
//! it.  Defaults reproduce the reference behavior described in the component
//! docs; tests override individual fields.

use crate::error::{HaulError, HaulResult};

/// Cost model for the new-segment planner's best-first search.
///
/// All costs are in abstract units where one plain step costs `step_cost`.
/// The bonuses are subtracted from the step cost, so `step_cost` must exceed
/// `road_reuse_bonus + wall_hug_bonus` to keep every expansion positive.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannerCosts {
    /// Base cost of entering a cell.
    pub step_cost: u32,
    /// Added when the step changes direction relative to the previous one.
    pub turn_penalty: u32,
    /// Subtracted when the entered cell already carries a road segment.
    pub road_reuse_bonus: u32,
    /// Subtracted when the entered cell is orthogonally adjacent to a
    /// building cell (roads hugging walls waste less land).
    pub wall_hug_bonus: u32,
    /// Extra cells added around the start/goal bounding box to form the
    /// search corridor.
    pub corridor_margin: u32,
    /// Hard cap on best-first expansions; hitting it yields "no plan".
    pub expansion_ceiling: u32,
}

impl Default for PlannerCosts {
    fn default() -> Self {
        Self {
            step_cost: 10,
            turn_penalty: 4,
            road_reuse_bonus: 6,
            wall_hug_bonus: 2,
            corridor_margin: 4,
            expansion_ceiling: 20_000,
        }
    }
}

/// Top-level logistics configuration.
///
/// Typically built via `LogisticsConfig::default()` and adjusted field-wise,
/// then checked once with [`validate`](Self::validate).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogisticsConfig {
    // ── Request hysteresis ────────────────────────────────────────────────
    /// A consumer registers a restock request when an input slot's fill
    /// ratio drops to or below this value.
    pub request_fill_threshold: f32,
    /// An active request is withdrawn once the slot's fill ratio reaches
    /// this value.  Must be strictly above `request_fill_threshold`.
    pub request_clear_threshold: f32,

    // ── Route re-evaluation ───────────────────────────────────────────────
    /// A route is opportunistically re-evaluated once its destination
    /// reaches this fill ratio.
    pub refresh_fill_threshold: f32,
    /// Multiplexed rotation skips consumers at or above this fill ratio.
    pub multiplex_skip_fill: f32,
    /// Completed deliveries before a multiplexed route rotates to the next
    /// consumer.
    pub round_robin_batch: u32,
    /// Ticks between route-discovery retries for an unconfigured endpoint.
    pub route_retry_interval: u64,
    /// Frontier limit for the routing engine's reachability queries.
    pub distance_horizon: u32,

    // ── Hauler timing ─────────────────────────────────────────────────────
    /// Ticks a loading operation occupies.
    pub load_duration: u32,
    /// Ticks an unloading operation occupies.
    pub unload_duration: u32,
    /// Ticks to wait before retrying a partially failed transfer.
    pub capacity_retry_delay: u32,
    /// Base travel speed in cells per tick, before the per-cell road
    /// multiplier.
    pub base_speed: f32,

    // ── Cargo ─────────────────────────────────────────────────────────────
    /// Units one cargo slot can hold.
    pub slot_capacity: u32,
    /// Number of cargo slots per hauler.
    pub slot_count: usize,

    // ── Path queries ──────────────────────────────────────────────────────
    /// Largest ring searched when a footprint has no perimeter road access.
    pub max_access_radius: u32,
    /// Hard ceiling on path-reconstruction rewind steps.
    pub path_step_ceiling: u32,
    /// New-segment planner cost model.
    pub planner: PlannerCosts,

    // ── Policy ────────────────────────────────────────────────────────────
    /// When `true`, input loading never draws a kind from a generic depot
    /// if the registry contains a dedicated producer of that kind (the
    /// hauler waits for direct production instead).
    pub prefer_dedicated_producer: bool,
    /// Search radius (in road steps) for depot restock request matching.
    pub board_search_radius: u32,

    // ── Determinism ───────────────────────────────────────────────────────
    /// Master seed for retry staggering and demo world generation.  The
    /// same seed always produces identical runs.
    pub seed: u64,
}

impl Default for LogisticsConfig {
    fn default() -> Self {
        Self {
            request_fill_threshold: 0.25,
            request_clear_threshold: 0.80,
            refresh_fill_threshold: 0.90,
            multiplex_skip_fill: 0.95,
            round_robin_batch: 3,
            route_retry_interval: 16,
            distance_horizon: 512,
            load_duration: 4,
            unload_duration: 4,
            capacity_retry_delay: 6,
            base_speed: 0.5,
            slot_capacity: 5,
            slot_count: 3,
            max_access_radius: 3,
            path_step_ceiling: 4_096,
            planner: PlannerCosts::default(),
            prefer_dedicated_producer: true,
            board_search_radius: 64,
            seed: 0x00C0_FFEE,
        }
    }
}

impl LogisticsConfig {
    /// Reject configurations that would wedge the subsystem.
    pub fn validate(&self) -> HaulResult<()> {
        if self.request_fill_threshold >= self.request_clear_threshold {
            return Err(HaulError::Config(format!(
                "request_fill_threshold ({}) must be below request_clear_threshold ({})",
                self.request_fill_threshold, self.request_clear_threshold
            )));
        }
        if self.slot_count == 0 || self.slot_capacity == 0 {
            return Err(HaulError::Config(
                "slot_count and slot_capacity must be nonzero".into(),
            ));
        }
        if self.base_speed <= 0.0 {
            return Err(HaulError::Config("base_speed must be positive".into()));
        }
        if self.route_retry_interval == 0 {
            return Err(HaulError::Config("route_retry_interval must be nonzero".into()));
        }
        let p = &self.planner;
        if p.step_cost <= p.road_reuse_bonus + p.wall_hug_bonus {
            return Err(HaulError::Config(format!(
                "planner step_cost ({}) must exceed road_reuse_bonus + wall_hug_bonus ({})",
                p.step_cost,
                p.road_reuse_bonus + p.wall_hug_bonus
            )));
        }
        Ok(())
    }
}
