//! The hauler fleet: slab storage plus the per-tick haul-cycle driver.
//!
//! # Haul cycle
//!
//! A producer's hauler loads from the home output pile, travels to the
//! destination the routing engine assigned, unloads, opportunistically loads
//! home-needed inputs at the same stop, and returns.  A depot's hauler
//! instead watches the request board and delivers stocked kinds to the most
//! urgent reachable requester.  A consumer's hauler can also fetch directly
//! when its home runs critically low and the assigned source has stock.
//!
//! # Failure policy
//!
//! Cargo is never discarded: undeliverable goods ride back and are restocked
//! at home.  Full destinations and empty sources cause a short-delay retry of
//! the same step.  Failed path lookups abort the leg and redirect home, with
//! periodic replanning while stranded.  A leg already underway is never
//! rerouted by later road edits.

use tracing::{debug, warn};

use haul_core::{
    CellCoord, EndpointId, HaulError, HaulResult, HaulerId, LogisticsConfig, ResourceKind,
};
use haul_graph::{reconstruct_path, road_access_cells, RoadGraph};
use haul_routing::{RequestBoard, RoutingEngine};
use haul_world::{EndpointRegistry, GridMap};

use crate::cargo::CargoHold;
use crate::state::{HaulState, Leg, Timer};

// ── DeliveryRecord ────────────────────────────────────────────────────────────

/// One completed transfer away from home, drained by the host per tick for
/// observers and delivery logs.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeliveryRecord {
    pub hauler: HaulerId,
    pub source: EndpointId,
    pub destination: EndpointId,
    pub kind: ResourceKind,
    pub amount: u32,
}

// ── Hauler ────────────────────────────────────────────────────────────────────

/// One transport agent.
#[derive(Clone, Debug)]
pub struct Hauler {
    pub id: HaulerId,
    /// The endpoint this hauler works for; cargo recovery always targets it.
    pub home: EndpointId,
    pub state: HaulState,
    pub hold: CargoHold,
    position: CellCoord,
    leg: Option<Leg>,
    timer: Option<Timer>,
    target: Option<EndpointId>,
    pending_kind: Option<ResourceKind>,
}

impl Hauler {
    pub fn position(&self) -> CellCoord {
        self.position
    }

    pub fn target(&self) -> Option<EndpointId> {
        self.target
    }
}

// ── HaulerFleet ───────────────────────────────────────────────────────────────

/// Slab storage for haulers with O(1) lookup, plus the tick driver.
#[derive(Default)]
pub struct HaulerFleet {
    slots: Vec<Option<Hauler>>,
    free: Vec<u32>,
    len: usize,
    deliveries: Vec<DeliveryRecord>,
}

impl HaulerFleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hauler working for `home`.
    pub fn spawn(
        &mut self,
        home: EndpointId,
        registry: &EndpointRegistry,
        config: &LogisticsConfig,
    ) -> HaulResult<HaulerId> {
        let endpoint = registry.get(home).ok_or(HaulError::EndpointNotFound(home))?;
        let id = match self.free.pop() {
            Some(slot) => HaulerId(slot),
            None => {
                self.slots.push(None);
                HaulerId((self.slots.len() - 1) as u32)
            }
        };
        self.slots[id.index()] = Some(Hauler {
            id,
            home,
            state: HaulState::Idle,
            hold: CargoHold::new(config.slot_count, config.slot_capacity),
            position: endpoint.footprint.center(),
            leg: None,
            timer: None,
            target: None,
            pending_kind: None,
        });
        self.len += 1;
        Ok(id)
    }

    /// Remove a hauler, returning any cargo to its home stores first.
    pub fn despawn(&mut self, id: HaulerId, registry: &mut EndpointRegistry) -> HaulResult<()> {
        let slot = self
            .slots
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(HaulError::HaulerNotFound(id))?;
        self.free.push(id.0);
        self.len -= 1;

        let mut hauler = slot;
        if !hauler.hold.is_empty() {
            if let Some(home) = registry.get_mut(hauler.home) {
                for kind in hauler.hold.kinds() {
                    let amount = hauler.hold.carried(kind);
                    let accepted = home.restock_output(kind, amount);
                    hauler.hold.unload(kind, accepted);
                }
            }
            if !hauler.hold.is_empty() {
                warn!(hauler = %id, units = hauler.hold.total(),
                    "despawned hauler's cargo could not be returned");
            }
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, id: HaulerId) -> Option<&Hauler> {
        self.slots.get(id.index())?.as_ref()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hauler> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }

    // ── Tick driver ───────────────────────────────────────────────────────

    /// Advance every hauler by one tick.
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        registry: &mut EndpointRegistry,
        grid: &GridMap,
        graph: &RoadGraph,
        engine: &mut RoutingEngine,
        board: &RequestBoard,
        config: &LogisticsConfig,
    ) {
        for i in 0..self.slots.len() {
            let Some(mut hauler) = self.slots[i].take() else {
                continue;
            };
            step(
                &mut hauler,
                registry,
                grid,
                graph,
                engine,
                board,
                config,
                &mut self.deliveries,
            );
            self.slots[i] = Some(hauler);
        }
    }

    /// Take all delivery records accumulated since the last drain.
    pub fn drain_deliveries(&mut self) -> Vec<DeliveryRecord> {
        std::mem::take(&mut self.deliveries)
    }
}

// ── Per-hauler step ───────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn step(
    h: &mut Hauler,
    registry: &mut EndpointRegistry,
    grid: &GridMap,
    graph: &RoadGraph,
    engine: &mut RoutingEngine,
    board: &RequestBoard,
    config: &LogisticsConfig,
    deliveries: &mut Vec<DeliveryRecord>,
) {
    match h.state {
        HaulState::Idle => step_idle(h, registry, graph, engine, board, config),
        HaulState::LoadingOutput => step_loading_output(h, registry, graph, config),
        HaulState::DeliveringOutput => step_delivering(h, registry, grid, graph, config),
        HaulState::UnloadingOutput => step_unloading(h, registry, graph, engine, config, deliveries),
        HaulState::LoadingInput => step_loading_input(h, registry, graph, config),
        HaulState::ReturningWithInput => step_returning(h, registry, grid, graph, config),
    }
}

fn step_idle(
    h: &mut Hauler,
    registry: &mut EndpointRegistry,
    graph: &RoadGraph,
    engine: &RoutingEngine,
    board: &RequestBoard,
    config: &LogisticsConfig,
) {
    // Leftover cargo from a failed run: keep trying to restock it at home.
    if !h.hold.is_empty() {
        if let Some(home) = registry.get_mut(h.home) {
            for kind in h.hold.kinds() {
                let amount = h.hold.carried(kind);
                let accepted = home.restock_output(kind, amount);
                h.hold.unload(kind, accepted);
            }
        }
        return;
    }

    let Some(home) = registry.get(h.home) else {
        return;
    };
    let access = road_access_cells(graph, &home.footprint, config.max_access_radius);

    // Output delivery along the standing route.
    if let Some(kind) = home.produced_kind() {
        if home.available(kind) > 0 {
            if let Some(dest) = engine.output_destination(h.home) {
                h.pending_kind = Some(kind);
                h.target = Some(dest);
                h.state = HaulState::LoadingOutput;
                h.timer = Some(Timer::new(config.load_duration));
                return;
            }
        }
    }

    // Depot home: service the most urgent reachable restock request.
    if home.is_depot() {
        for kind in ResourceKind::ALL {
            if home.available(kind) == 0 {
                continue;
            }
            if let Some(request) =
                board.best_request(graph, &access, kind, config.board_search_radius)
            {
                debug!(hauler = %h.id, requester = %request.requester, %kind,
                    priority = request.priority, "servicing restock request");
                h.pending_kind = Some(kind);
                h.target = Some(request.requester);
                h.state = HaulState::LoadingOutput;
                h.timer = Some(Timer::new(config.load_duration));
                return;
            }
        }
    }

    // Direct fetch: home critically low on an input and the assigned source
    // already has stock.
    let Some(input) = &home.input else {
        return;
    };
    if !input
        .min_fill_ratio()
        .is_some_and(|r| r < config.request_fill_threshold)
    {
        return;
    }
    let Some(source_id) = engine.input_source(h.home) else {
        return;
    };
    let Some(source) = registry.get(source_id) else {
        return;
    };
    let wanted = input.most_underfilled(config.slot_count);
    if !wanted.iter().any(|&k| source.provides(k)) {
        return;
    }
    let to = road_access_cells(graph, &source.footprint, config.max_access_radius);
    if let Some(leg) = plan_between(graph, &access, &to, config.path_step_ceiling) {
        h.target = Some(source_id);
        h.leg = Some(leg);
        h.state = HaulState::ReturningWithInput;
    }
}

fn step_loading_output(
    h: &mut Hauler,
    registry: &mut EndpointRegistry,
    graph: &RoadGraph,
    config: &LogisticsConfig,
) {
    if !timer_elapsed(h) {
        return;
    }
    let Some(kind) = h.pending_kind.take() else {
        reset_to_idle(h, registry);
        return;
    };

    // One slot's worth per loading operation.
    let want = config.slot_capacity.min(h.hold.free_for(kind));
    let taken = match registry.get_mut(h.home) {
        Some(home) => home.withdraw(kind, want),
        None => 0,
    };
    h.hold.load(kind, taken);

    if h.hold.is_empty() {
        reset_to_idle(h, registry);
        return;
    }

    let leg = h.target.and_then(|t| {
        let dest = registry.get(t)?;
        let from = road_access_cells(
            graph,
            &registry.get(h.home)?.footprint,
            config.max_access_radius,
        );
        let to = road_access_cells(graph, &dest.footprint, config.max_access_radius);
        plan_between(graph, &from, &to, config.path_step_ceiling)
    });

    match leg {
        Some(leg) => {
            h.position = leg.position();
            h.leg = Some(leg);
            h.state = HaulState::DeliveringOutput;
        }
        None => {
            // Route failure right after loading: put the goods back.
            debug!(hauler = %h.id, target = ?h.target, "no route to destination, restocking");
            return_cargo_home(h, registry);
            reset_to_idle(h, registry);
        }
    }
}

fn step_delivering(
    h: &mut Hauler,
    registry: &mut EndpointRegistry,
    grid: &GridMap,
    graph: &RoadGraph,
    config: &LogisticsConfig,
) {
    if let Some(leg) = &mut h.leg {
        let arrived = leg.advance(grid, config.base_speed);
        h.position = leg.position();
        if !arrived {
            return;
        }
        h.leg = None;
    }

    // Arrived; a pending timer here is the capacity-wait backoff.
    if !timer_elapsed(h) {
        return;
    }

    let Some(target_id) = h.target else {
        head_home(h, registry, graph, config);
        return;
    };
    match registry.get(target_id) {
        None => head_home(h, registry, graph, config),
        Some(dest) => {
            let can_accept = h.hold.kinds().iter().any(|&k| dest.delivery_space(k) > 0);
            if can_accept {
                h.state = HaulState::UnloadingOutput;
                h.timer = Some(Timer::new(config.unload_duration));
            } else {
                // Destination full: wait in place and re-check.
                h.timer = Some(Timer::new(config.capacity_retry_delay));
            }
        }
    }
}

fn step_unloading(
    h: &mut Hauler,
    registry: &mut EndpointRegistry,
    graph: &RoadGraph,
    engine: &mut RoutingEngine,
    config: &LogisticsConfig,
    deliveries: &mut Vec<DeliveryRecord>,
) {
    if !timer_elapsed(h) {
        return;
    }
    let Some(target_id) = h.target else {
        head_home(h, registry, graph, config);
        return;
    };
    let at_home = target_id == h.home;

    let deposited = match registry.get_mut(target_id) {
        None => false,
        Some(dest) => {
            for kind in h.hold.kinds() {
                let amount = h.hold.carried(kind);
                let accepted = if at_home {
                    dest.restock_output(kind, amount)
                } else {
                    dest.deposit(kind, amount)
                };
                h.hold.unload(kind, accepted);
                if !at_home && accepted > 0 {
                    deliveries.push(DeliveryRecord {
                        hauler: h.id,
                        source: h.home,
                        destination: target_id,
                        kind,
                        amount: accepted,
                    });
                }
            }
            true
        }
    };

    if !deposited {
        // Destination destroyed mid-unload; carry everything back.
        if at_home {
            reset_to_idle(h, registry);
        } else {
            head_home(h, registry, graph, config);
        }
        return;
    }

    if !h.hold.is_empty() {
        // Partial transfer: short delay, retry the same step.
        h.timer = Some(Timer::new(config.capacity_retry_delay));
        return;
    }

    if at_home {
        reset_to_idle(h, registry);
        return;
    }

    engine.notify_delivery_completed(h.home, registry, graph, config);

    // Same-stop input loading: worth it only if this location can provide
    // something home actually needs.
    if can_load_input_at(h, registry, target_id, config) {
        h.state = HaulState::LoadingInput;
        h.timer = Some(Timer::new(config.load_duration));
    } else {
        head_home(h, registry, graph, config);
    }
}

fn step_loading_input(
    h: &mut Hauler,
    registry: &mut EndpointRegistry,
    graph: &RoadGraph,
    config: &LogisticsConfig,
) {
    if !timer_elapsed(h) {
        return;
    }
    let Some(location_id) = h.target else {
        head_home(h, registry, graph, config);
        return;
    };

    let allowed = loadable_kinds(h, registry, location_id, config);
    for kind in allowed {
        let want = config.slot_capacity.min(h.hold.free_for(kind));
        if want == 0 {
            continue;
        }
        let taken = match registry.get_mut(location_id) {
            Some(location) => location.withdraw(kind, want),
            None => 0,
        };
        h.hold.load(kind, taken);
    }

    // Home with whatever was gathered, possibly nothing.
    head_home(h, registry, graph, config);
}

fn step_returning(
    h: &mut Hauler,
    registry: &mut EndpointRegistry,
    grid: &GridMap,
    graph: &RoadGraph,
    config: &LogisticsConfig,
) {
    let Some(leg) = &mut h.leg else {
        // Stranded without a leg: periodic replanning toward the target.
        if !timer_elapsed(h) {
            return;
        }
        let target_id = h.target.unwrap_or(h.home);
        let planned = registry.get(target_id).and_then(|t| {
            let to = road_access_cells(graph, &t.footprint, config.max_access_radius);
            plan_between(graph, &[h.position], &to, config.path_step_ceiling)
        });
        match planned {
            Some(leg) => h.leg = Some(leg),
            None => h.timer = Some(Timer::new(config.capacity_retry_delay)),
        }
        return;
    };

    let arrived = leg.advance(grid, config.base_speed);
    h.position = leg.position();
    if !arrived {
        return;
    }
    h.leg = None;

    if h.target == Some(h.home) || h.target.is_none() {
        if h.hold.is_empty() {
            reset_to_idle(h, registry);
        } else {
            // Timed unload into home stores.
            h.target = Some(h.home);
            h.state = HaulState::UnloadingOutput;
            h.timer = Some(Timer::new(config.unload_duration));
        }
    } else {
        // Direct-fetch arrival at the input source.
        h.state = HaulState::LoadingInput;
        h.timer = Some(Timer::new(config.load_duration));
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Advance the pending timer; `true` when no timer is pending or it just
/// elapsed (and was cleared).
fn timer_elapsed(h: &mut Hauler) -> bool {
    match &mut h.timer {
        None => true,
        Some(timer) => {
            if timer.tick() {
                h.timer = None;
                true
            } else {
                false
            }
        }
    }
}

/// First reconstructable road path between two access-cell sets.
fn plan_between(
    graph: &RoadGraph,
    from: &[CellCoord],
    to: &[CellCoord],
    step_ceiling: u32,
) -> Option<Leg> {
    for &start in from {
        for &goal in to {
            if let Some(path) = reconstruct_path(graph, start, goal, step_ceiling) {
                return Some(Leg::new(path));
            }
        }
    }
    None
}

/// Redirect toward home, replanning later if no path exists right now.
fn head_home(
    h: &mut Hauler,
    registry: &EndpointRegistry,
    graph: &RoadGraph,
    config: &LogisticsConfig,
) {
    h.target = Some(h.home);
    h.state = HaulState::ReturningWithInput;
    let planned = registry.get(h.home).and_then(|home| {
        let to = road_access_cells(graph, &home.footprint, config.max_access_radius);
        plan_between(graph, &[h.position], &to, config.path_step_ceiling)
    });
    match planned {
        Some(leg) => h.leg = Some(leg),
        None => h.timer = Some(Timer::new(config.capacity_retry_delay)),
    }
}

/// Push everything in the hold back into home stores (hauler is at home).
fn return_cargo_home(h: &mut Hauler, registry: &mut EndpointRegistry) {
    if let Some(home) = registry.get_mut(h.home) {
        for kind in h.hold.kinds() {
            let amount = h.hold.carried(kind);
            let accepted = home.restock_output(kind, amount);
            h.hold.unload(kind, accepted);
        }
    }
}

fn reset_to_idle(h: &mut Hauler, registry: &EndpointRegistry) {
    h.state = HaulState::Idle;
    h.leg = None;
    h.timer = None;
    h.target = None;
    h.pending_kind = None;
    if let Some(home) = registry.get(h.home) {
        h.position = home.footprint.center();
    }
}

/// `true` if `location` can provide a kind home needs, honoring the
/// dedicated-producer preference for depot draws.
fn can_load_input_at(
    h: &Hauler,
    registry: &EndpointRegistry,
    location_id: EndpointId,
    config: &LogisticsConfig,
) -> bool {
    !loadable_kinds(h, registry, location_id, config).is_empty()
}

/// Home-needed kinds this location may supply, most under-filled first.
///
/// When the dedicated-producer policy is on, a generic depot is skipped for
/// any kind some producer makes: the hauler waits for direct production
/// rather than draining shared storage.
fn loadable_kinds(
    h: &Hauler,
    registry: &EndpointRegistry,
    location_id: EndpointId,
    config: &LogisticsConfig,
) -> Vec<ResourceKind> {
    let Some(home) = registry.get(h.home) else {
        return Vec::new();
    };
    let Some(input) = &home.input else {
        return Vec::new();
    };
    let Some(location) = registry.get(location_id) else {
        return Vec::new();
    };
    input
        .most_underfilled(config.slot_count)
        .into_iter()
        .filter(|&kind| location.provides(kind))
        .filter(|&kind| {
            !(config.prefer_dedicated_producer
                && location.is_depot()
                && location.produced_kind() != Some(kind)
                && registry.producers_of(kind).next().is_some())
        })
        .collect()
}
