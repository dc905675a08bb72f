//! Declarative setup for a wired simulation.
//!
//! The builder batches roads, endpoints, and hauler assignments, then lays
//! everything out at `build()` time.  The graph is rebuilt from the grid once
//! at the end (and its events drained), so a freshly built sim starts with no
//! pending invalidations regardless of insertion order.

use haul_core::{CellCoord, Footprint, LogisticsConfig, ResourceKind};
use haul_world::{Endpoint, OutputStock};

use crate::error::SimResult;
use crate::sim::Sim;

/// Batched world description; endpoints are `(endpoint, wants_hauler)`.
#[derive(Default)]
pub struct SimBuilder {
    config: LogisticsConfig,
    roads: Vec<(CellCoord, f32)>,
    endpoints: Vec<(Endpoint, bool)>,
}

impl SimBuilder {
    pub fn new() -> Self {
        Self {
            config: LogisticsConfig::default(),
            roads: Vec::new(),
            endpoints: Vec::new(),
        }
    }

    pub fn config(mut self, config: LogisticsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn road(mut self, cell: CellCoord) -> Self {
        self.roads.push((cell, 1.0));
        self
    }

    pub fn road_with_multiplier(mut self, cell: CellCoord, multiplier: f32) -> Self {
        self.roads.push((cell, multiplier));
        self
    }

    /// A straight run of road cells between two axis-aligned coordinates.
    pub fn road_line(mut self, from: CellCoord, to: CellCoord) -> Self {
        debug_assert!(from.x == to.x || from.z == to.z);
        if from.x == to.x {
            let (lo, hi) = (from.z.min(to.z), from.z.max(to.z));
            for z in lo..=hi {
                self.roads.push((CellCoord::new(from.x, z), 1.0));
            }
        } else {
            let (lo, hi) = (from.x.min(to.x), from.x.max(to.x));
            for x in lo..=hi {
                self.roads.push((CellCoord::new(x, from.z), 1.0));
            }
        }
        self
    }

    /// Producer of `kind` with a pre-stocked pile.
    pub fn producer(
        mut self,
        footprint: Footprint,
        kind: ResourceKind,
        capacity: u32,
        initial: u32,
    ) -> Self {
        self.endpoints.push((
            Endpoint::new(footprint).with_output(OutputStock::with_amount(kind, capacity, initial)),
            false,
        ));
        self
    }

    pub fn consumer(mut self, footprint: Footprint, slots: &[(ResourceKind, u32)]) -> Self {
        self.endpoints
            .push((Endpoint::consumer(footprint, slots), false));
        self
    }

    pub fn depot(mut self, footprint: Footprint, capacity_per_kind: u32) -> Self {
        self.endpoints
            .push((Endpoint::depot(footprint, capacity_per_kind), false));
        self
    }

    /// Any prebuilt endpoint.
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push((endpoint, false));
        self
    }

    /// Give the most recently added endpoint a hauler.
    ///
    /// # Panics
    /// Panics if no endpoint has been added yet.
    pub fn with_hauler(mut self) -> Self {
        self.endpoints
            .last_mut()
            .expect("with_hauler needs a preceding endpoint")
            .1 = true;
        self
    }

    /// Lay everything out and return the wired simulation.
    ///
    /// Endpoint IDs are assigned in insertion order starting at 0, so callers
    /// can predict them; prefer capturing them from `Sim::spawn_endpoint`
    /// when adding endpoints after the build.
    pub fn build(self) -> SimResult<Sim> {
        let mut sim = Sim::new(self.config)?;
        for (cell, multiplier) in self.roads {
            sim.add_road(cell, multiplier)?;
        }
        for (endpoint, wants_hauler) in self.endpoints {
            let id = sim.spawn_endpoint(endpoint)?;
            if wants_hauler {
                sim.spawn_hauler(id)?;
            }
        }
        // Rebuild once so ordering never matters, then start event-clean.
        sim.graph.rebuild(&sim.grid);
        sim.graph.drain_events();
        Ok(sim)
    }
}
