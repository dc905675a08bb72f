//! The simulation orchestrator.
//!
//! `Sim` owns every subsystem and advances them in a fixed phase order each
//! tick:
//!
//! 1. drain road-graph events into the routing engine (cache invalidation),
//! 2. reconcile the request board against buffer fill levels,
//! 3. routing-engine maintenance (retries, revalidation, refreshes),
//! 4. fleet step (movement, timed operations, transfers),
//! 5. observer hooks for the deliveries the fleet completed.
//!
//! Everything runs on one logical thread; each phase exclusively owns the
//! structures it mutates, so no operation races another within a tick.

use tracing::debug;

use haul_agent::HaulerFleet;
use haul_core::{CellCoord, EndpointId, HaulError, HaulerId, LogisticsConfig, Tick};
use haul_graph::{plan_segment, RoadGraph};
use haul_routing::{RequestBoard, RoutingEngine};
use haul_world::{Endpoint, EndpointRegistry, GridMap};

use crate::error::SimResult;
use crate::observer::SimObserver;

/// The fully wired logistics simulation.
pub struct Sim {
    pub grid: GridMap,
    pub graph: RoadGraph,
    pub registry: EndpointRegistry,
    pub engine: RoutingEngine,
    pub board: RequestBoard,
    pub fleet: HaulerFleet,
    pub config: LogisticsConfig,
    now: Tick,
}

impl Sim {
    /// Construct an empty simulation after validating `config`.
    pub fn new(config: LogisticsConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            grid: GridMap::new(),
            graph: RoadGraph::new(),
            registry: EndpointRegistry::new(),
            engine: RoutingEngine::new(),
            board: RequestBoard::new(),
            fleet: HaulerFleet::new(),
            config,
            now: Tick::ZERO,
        })
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    // ── Tick loop ─────────────────────────────────────────────────────────

    /// Advance the whole simulation by one tick.
    pub fn tick(&mut self, observer: &mut dyn SimObserver) {
        observer.on_tick_start(self.now);

        let events = self.graph.drain_events();
        self.engine.apply_events(&events);

        self.board.sync(&self.registry, &self.graph, &self.config);
        self.engine
            .tick(self.now, &self.registry, &self.graph, &self.config);
        self.fleet.tick(
            &mut self.registry,
            &self.grid,
            &self.graph,
            &mut self.engine,
            &self.board,
            &self.config,
        );

        for record in self.fleet.drain_deliveries() {
            observer.on_delivery(self.now, &record);
        }

        observer.on_tick_end(self.now);
        self.now.advance();
    }

    /// Run `n` ticks, then fire the end-of-run hook.
    pub fn run_ticks(&mut self, n: u64, observer: &mut dyn SimObserver) {
        for _ in 0..n {
            self.tick(observer);
        }
        observer.on_sim_end(self.now);
    }

    // ── Road surface ──────────────────────────────────────────────────────

    /// Lay a road segment, keeping grid and graph in step.
    pub fn add_road(&mut self, cell: CellCoord, multiplier: f32) -> SimResult<()> {
        self.grid.set_road(cell, multiplier)?;
        self.graph.add_segment(cell);
        Ok(())
    }

    /// Remove the segment at `cell`; returns whether one existed.
    pub fn remove_road(&mut self, cell: CellCoord) -> bool {
        let existed = self.grid.clear_road(cell);
        if existed {
            self.graph.remove_segment(cell);
        }
        existed
    }

    /// Preview the cells a new road between `start` and `goal` would cover.
    /// Passthrough for road-drawing UI; does not mutate anything.
    pub fn plan_road(&self, start: CellCoord, goal: CellCoord) -> Option<Vec<CellCoord>> {
        plan_segment(&self.grid, &self.graph, start, goal, &self.config.planner)
    }

    /// Plan and immediately lay a road between `start` and `goal`.
    /// Returns the laid cells, or `None` when no plan was found.
    pub fn build_road(&mut self, start: CellCoord, goal: CellCoord) -> SimResult<Option<Vec<CellCoord>>> {
        let Some(path) = self.plan_road(start, goal) else {
            return Ok(None);
        };
        for &cell in &path {
            self.add_road(cell, 1.0)?;
        }
        Ok(Some(path))
    }

    // ── Endpoint surface ──────────────────────────────────────────────────

    /// Register an endpoint and claim its footprint on the grid.
    pub fn spawn_endpoint(&mut self, endpoint: Endpoint) -> SimResult<EndpointId> {
        let footprint = endpoint.footprint;
        let id = self.registry.insert(endpoint);
        if let Err(err) = self.grid.place_footprint(&footprint, id) {
            self.registry.remove(id);
            return Err(err.into());
        }
        debug!(%id, root = %footprint.root, "endpoint spawned");
        Ok(id)
    }

    /// Destroy an endpoint: frees its grid cells and purges every routing,
    /// board, and (lazily, via re-validation) fleet reference to it.
    pub fn despawn_endpoint(&mut self, id: EndpointId) -> SimResult<()> {
        let endpoint = self
            .registry
            .remove(id)
            .ok_or(HaulError::EndpointNotFound(id))?;
        self.grid.clear_footprint(&endpoint.footprint);
        self.engine.on_endpoint_removed(id);
        self.board.remove_requester(id);
        debug!(%id, "endpoint despawned");
        Ok(())
    }

    /// Re-evaluate both route directions for `id` right now.
    pub fn force_route_refresh(&mut self, id: EndpointId) -> SimResult<()> {
        self.engine
            .force_refresh(id, &self.registry, &self.graph, &self.config)?;
        Ok(())
    }

    // ── Fleet surface ─────────────────────────────────────────────────────

    pub fn spawn_hauler(&mut self, home: EndpointId) -> SimResult<HaulerId> {
        Ok(self.fleet.spawn(home, &self.registry, &self.config)?)
    }

    /// Remove a hauler; its cargo is returned to its home stores.
    pub fn despawn_hauler(&mut self, id: HaulerId) -> SimResult<()> {
        Ok(self.fleet.despawn(id, &mut self.registry)?)
    }
}
