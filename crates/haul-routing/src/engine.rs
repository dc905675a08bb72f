//! The resource routing engine: per-endpoint counterpart discovery, load
//! balancing, and periodic re-evaluation.
//!
//! # Ranking
//!
//! Candidates for a route are ordered by a strict key:
//!
//! 1. fewer already-assigned competing routes (load),
//! 2. lower destination fill ratio (delivery direction only),
//! 3. shorter road distance,
//! 4. endpoint id (pure tie-break, for determinism).
//!
//! Consumers are tried first; when none is viable the nearest reachable
//! depot is selected under the same order.  Unreachable candidates are
//! discarded silently — unreachability is never an error here.
//!
//! # Re-evaluation
//!
//! Unconfigured endpoints retry on a fixed interval, staggered per endpoint
//! so a mass placement doesn't re-evaluate everything on the same tick.
//! Configured routes are opportunistically re-checked on the same cadence
//! when the destination is nearly full or a strictly less-loaded alternative
//! has appeared, and are revalidated for reachability whenever the road
//! graph reports changes.

use rustc_hash::FxHashMap;
use tracing::debug;

use haul_core::{stagger, EndpointId, HaulError, HaulResult, LogisticsConfig, ResourceKind, Tick};
use haul_graph::{distances, road_access_cells, RoadEvent, RoadGraph};
use haul_world::{Endpoint, EndpointRegistry};

// ── Types ─────────────────────────────────────────────────────────────────────

/// A chosen counterpart for one direction of an endpoint's traffic.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct RouteAssignment {
    pub counterpart: EndpointId,
    /// Road distance (hops) between the pair's access cells at assignment
    /// time.  Informational; paths are recomputed when a haul starts.
    pub distance: u32,
}

/// How a producer's deliveries are spread across consumers of its kind.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RouteMode {
    /// Fixed 1:1 pairing — chosen when producer and consumer counts for the
    /// kind are balanced.
    Exclusive,
    /// Round-robin rotation across consumers after a batch of completed
    /// deliveries.
    Multiplexed,
}

#[derive(Default)]
struct RouteRow {
    /// Where this endpoint's output is delivered.
    outbound: Option<RouteAssignment>,
    /// Where this endpoint's input is fetched from.
    inbound: Option<RouteAssignment>,
    /// Completed deliveries since the outbound route last rotated.
    deliveries_since_rotation: u32,
}

/// Internal candidate record used during ranking.
struct Candidate {
    id: EndpointId,
    load: u32,
    fill: f32,
    distance: u32,
}

// ── RoutingEngine ─────────────────────────────────────────────────────────────

/// Discovers and maintains route assignments for every registered endpoint.
#[derive(Default)]
pub struct RoutingEngine {
    rows: FxHashMap<EndpointId, RouteRow>,
    /// Producers currently assigned to deliver to each endpoint.
    dest_load: FxHashMap<EndpointId, u32>,
    /// Consumers currently assigned to draw from each endpoint.
    source_load: FxHashMap<EndpointId, u32>,
    /// Set when the road graph changed; cleared after the next revalidation.
    stale: bool,
}

impl RoutingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Surface for collaborators ─────────────────────────────────────────

    pub fn output_destination(&self, id: EndpointId) -> Option<EndpointId> {
        self.rows.get(&id)?.outbound.map(|a| a.counterpart)
    }

    pub fn input_source(&self, id: EndpointId) -> Option<EndpointId> {
        self.rows.get(&id)?.inbound.map(|a| a.counterpart)
    }

    /// `true` once either direction has a configured counterpart.
    pub fn has_route(&self, id: EndpointId) -> bool {
        self.rows
            .get(&id)
            .is_some_and(|r| r.outbound.is_some() || r.inbound.is_some())
    }

    /// How many producers currently deliver to `id`.
    pub fn delivery_load(&self, id: EndpointId) -> u32 {
        self.dest_load.get(&id).copied().unwrap_or(0)
    }

    /// Mode currently in effect for `kind`.
    pub fn mode_for(registry: &EndpointRegistry, kind: ResourceKind) -> RouteMode {
        if registry.count_producers(kind) == registry.count_consumers(kind) {
            RouteMode::Exclusive
        } else {
            RouteMode::Multiplexed
        }
    }

    /// Drop any state referencing a destroyed endpoint.
    pub fn on_endpoint_removed(&mut self, id: EndpointId) {
        if let Some(row) = self.rows.remove(&id) {
            if let Some(a) = row.outbound {
                decrement(&mut self.dest_load, a.counterpart);
            }
            if let Some(a) = row.inbound {
                decrement(&mut self.source_load, a.counterpart);
            }
        }
        let referencing: Vec<EndpointId> = self
            .rows
            .iter()
            .filter(|(_, r)| {
                r.outbound.is_some_and(|a| a.counterpart == id)
                    || r.inbound.is_some_and(|a| a.counterpart == id)
            })
            .map(|(&e, _)| e)
            .collect();
        for e in referencing {
            if let Some(row) = self.rows.get_mut(&e) {
                if row.outbound.is_some_and(|a| a.counterpart == id) {
                    row.outbound = None;
                }
                if row.inbound.is_some_and(|a| a.counterpart == id) {
                    row.inbound = None;
                }
            }
        }
        self.dest_load.remove(&id);
        self.source_load.remove(&id);
    }

    /// Note road-graph changes; assignments are revalidated next tick.
    pub fn apply_events(&mut self, events: &[RoadEvent]) {
        if !events.is_empty() {
            self.stale = true;
        }
    }

    /// Re-evaluate both directions for `id` immediately.
    pub fn force_refresh(
        &mut self,
        id: EndpointId,
        registry: &EndpointRegistry,
        graph: &RoadGraph,
        config: &LogisticsConfig,
    ) -> HaulResult<()> {
        let endpoint = registry.get(id).ok_or(HaulError::EndpointNotFound(id))?;
        let outbound = self.evaluate_outbound(endpoint, registry, graph, config);
        self.set_outbound(id, outbound);
        let inbound = self.evaluate_inbound(endpoint, registry, graph, config);
        self.set_inbound(id, inbound);
        Ok(())
    }

    /// A delivery from `producer` completed in full.  Advances round-robin
    /// accounting and rotates the destination in multiplexed mode.
    pub fn notify_delivery_completed(
        &mut self,
        producer: EndpointId,
        registry: &EndpointRegistry,
        graph: &RoadGraph,
        config: &LogisticsConfig,
    ) {
        let Some(endpoint) = registry.get(producer) else {
            return;
        };
        let Some(kind) = endpoint.produced_kind() else {
            return;
        };
        let row = self.rows.entry(producer).or_default();
        row.deliveries_since_rotation += 1;

        if Self::mode_for(registry, kind) != RouteMode::Multiplexed
            || row.deliveries_since_rotation < config.round_robin_batch
        {
            return;
        }

        let current = row.outbound.map(|a| a.counterpart);
        if let Some(next) = self.next_rotation_target(endpoint, kind, current, registry, graph, config)
        {
            debug!(%producer, from = ?current, to = %next.counterpart, "rotating multiplexed route");
            self.set_outbound(producer, Some(next));
        }
        self.rows
            .entry(producer)
            .or_default()
            .deliveries_since_rotation = 0;
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Periodic maintenance: retry unconfigured endpoints on their staggered
    /// cadence, revalidate after road changes, and opportunistically improve
    /// configured routes.
    pub fn tick(
        &mut self,
        now: Tick,
        registry: &EndpointRegistry,
        graph: &RoadGraph,
        config: &LogisticsConfig,
    ) {
        let stale = std::mem::take(&mut self.stale);
        let interval = config.route_retry_interval;
        let ids: Vec<EndpointId> = registry.iter().map(|e| e.id).collect();

        for id in ids {
            let Some(endpoint) = registry.get(id) else {
                continue;
            };
            self.rows.entry(id).or_default();
            let due = now.0 % interval == stagger(config.seed, id.0, interval);

            self.tick_outbound(endpoint, registry, graph, config, due, stale);
            self.tick_inbound(endpoint, registry, graph, config, due, stale);
        }
    }

    fn tick_outbound(
        &mut self,
        endpoint: &Endpoint,
        registry: &EndpointRegistry,
        graph: &RoadGraph,
        config: &LogisticsConfig,
        due: bool,
        stale: bool,
    ) {
        let id = endpoint.id;
        let Some(kind) = endpoint.produced_kind() else {
            // Lost its output pile; drop any leftover assignment.
            if self.rows.get(&id).is_some_and(|r| r.outbound.is_some()) {
                self.set_outbound(id, None);
            }
            return;
        };

        let current = self.rows.get(&id).and_then(|r| r.outbound);
        match current {
            None => {
                if due {
                    let assignment = self.evaluate_outbound(endpoint, registry, graph, config);
                    if let Some(a) = assignment {
                        debug!(endpoint = %id, dest = %a.counterpart, distance = a.distance,
                            "configured output route");
                        self.set_outbound(id, Some(a));
                    }
                }
            }
            Some(cur) => match registry.get(cur.counterpart) {
                None => {
                    debug!(endpoint = %id, dest = %cur.counterpart, "output destination removed");
                    let assignment = self.evaluate_outbound(endpoint, registry, graph, config);
                    self.set_outbound(id, assignment);
                }
                Some(dest) if stale && !self.is_reachable(endpoint, dest, graph, config) => {
                    debug!(endpoint = %id, dest = %cur.counterpart, "output route unreachable");
                    let assignment = self.evaluate_outbound(endpoint, registry, graph, config);
                    self.set_outbound(id, assignment);
                }
                Some(dest) if due => {
                    let nearly_full = dest
                        .fill_ratio(kind)
                        .is_some_and(|f| f >= config.refresh_fill_threshold);
                    // Load-based switching only applies to exclusive pairs;
                    // in multiplexed mode the rotation owns distribution and
                    // a load trigger would fight it.
                    let better_exists = Self::mode_for(registry, kind) == RouteMode::Exclusive
                        && self.less_loaded_candidate_exists(
                            endpoint,
                            kind,
                            cur.counterpart,
                            registry,
                        );
                    if nearly_full || better_exists {
                        let assignment = self.evaluate_outbound(endpoint, registry, graph, config);
                        self.set_outbound(id, assignment);
                    }
                }
                Some(_) => {}
            },
        }
    }

    fn tick_inbound(
        &mut self,
        endpoint: &Endpoint,
        registry: &EndpointRegistry,
        graph: &RoadGraph,
        config: &LogisticsConfig,
        due: bool,
        stale: bool,
    ) {
        let id = endpoint.id;
        if endpoint.input.is_none() {
            if self.rows.get(&id).is_some_and(|r| r.inbound.is_some()) {
                self.set_inbound(id, None);
            }
            return;
        }

        let current = self.rows.get(&id).and_then(|r| r.inbound);
        match current {
            None => {
                if due {
                    let assignment = self.evaluate_inbound(endpoint, registry, graph, config);
                    if let Some(a) = assignment {
                        debug!(endpoint = %id, source = %a.counterpart, "configured input route");
                        self.set_inbound(id, Some(a));
                    }
                }
            }
            Some(cur) => {
                let invalid = match registry.get(cur.counterpart) {
                    None => true,
                    Some(source) => stale && !self.is_reachable(endpoint, source, graph, config),
                };
                if invalid || due {
                    let assignment = self.evaluate_inbound(endpoint, registry, graph, config);
                    self.set_inbound(id, assignment);
                }
            }
        }
    }

    // ── Candidate evaluation ──────────────────────────────────────────────

    /// Best delivery destination for a producer, or `None` when nothing is
    /// reachable.
    fn evaluate_outbound(
        &self,
        producer: &Endpoint,
        registry: &EndpointRegistry,
        graph: &RoadGraph,
        config: &LogisticsConfig,
    ) -> Option<RouteAssignment> {
        let kind = producer.produced_kind()?;
        let sources = road_access_cells(graph, &producer.footprint, config.max_access_radius);
        if sources.is_empty() {
            return None;
        }
        let dmap = distances(graph, &sources, config.distance_horizon);

        let consumers = self.collect_candidates(
            registry.consumers_of(kind).filter(|e| e.id != producer.id),
            &dmap,
            graph,
            config,
            |e| self.delivery_load(e.id),
            |e| e.fill_ratio(kind).unwrap_or(1.0),
        );
        if let Some(best) = pick_best(consumers) {
            return Some(RouteAssignment { counterpart: best.id, distance: best.distance });
        }

        // Fallback: nearest reachable depot under the same order.
        let depots = self.collect_candidates(
            registry.depots().filter(|e| e.id != producer.id),
            &dmap,
            graph,
            config,
            |e| self.delivery_load(e.id),
            |e| e.fill_ratio(kind).unwrap_or(1.0),
        );
        pick_best(depots).map(|best| RouteAssignment { counterpart: best.id, distance: best.distance })
    }

    /// Best supply source for a consumer's most under-filled input kind.
    ///
    /// Supply ranking skips the fill tie-break — that criterion orders
    /// delivery destinations, not sources.
    fn evaluate_inbound(
        &self,
        consumer: &Endpoint,
        registry: &EndpointRegistry,
        graph: &RoadGraph,
        config: &LogisticsConfig,
    ) -> Option<RouteAssignment> {
        let input = consumer.input.as_ref()?;
        let kind = *input.most_underfilled(1).first()?;
        let sources = road_access_cells(graph, &consumer.footprint, config.max_access_radius);
        if sources.is_empty() {
            return None;
        }
        let dmap = distances(graph, &sources, config.distance_horizon);

        let producers = self.collect_candidates(
            registry.producers_of(kind).filter(|e| e.id != consumer.id),
            &dmap,
            graph,
            config,
            |e| self.source_load.get(&e.id).copied().unwrap_or(0),
            |_| 0.0,
        );
        if let Some(best) = pick_best(producers) {
            return Some(RouteAssignment { counterpart: best.id, distance: best.distance });
        }

        let depots = self.collect_candidates(
            registry.depots().filter(|e| e.id != consumer.id),
            &dmap,
            graph,
            config,
            |e| self.source_load.get(&e.id).copied().unwrap_or(0),
            |_| 0.0,
        );
        pick_best(depots).map(|best| RouteAssignment { counterpart: best.id, distance: best.distance })
    }

    fn collect_candidates<'a>(
        &self,
        endpoints: impl Iterator<Item = &'a Endpoint>,
        dmap: &FxHashMap<haul_core::CellCoord, u32>,
        graph: &RoadGraph,
        config: &LogisticsConfig,
        load_of: impl Fn(&Endpoint) -> u32,
        fill_of: impl Fn(&Endpoint) -> f32,
    ) -> Vec<Candidate> {
        endpoints
            .filter_map(|e| {
                let distance = road_access_cells(graph, &e.footprint, config.max_access_radius)
                    .iter()
                    .filter_map(|c| dmap.get(c))
                    .min()
                    .copied()?;
                Some(Candidate {
                    id: e.id,
                    load: load_of(e),
                    fill: fill_of(e),
                    distance,
                })
            })
            .collect()
    }

    /// Reachability check between two endpoints' access cells.
    fn is_reachable(
        &self,
        a: &Endpoint,
        b: &Endpoint,
        graph: &RoadGraph,
        config: &LogisticsConfig,
    ) -> bool {
        let from = road_access_cells(graph, &a.footprint, config.max_access_radius);
        if from.is_empty() {
            return false;
        }
        let dmap = distances(graph, &from, config.distance_horizon);
        road_access_cells(graph, &b.footprint, config.max_access_radius)
            .iter()
            .any(|c| dmap.contains_key(c))
    }

    /// `true` when some other candidate consumer of `kind` carries strictly
    /// less delivery load than the current counterpart.  Cheap trigger; the
    /// full (reachability-checked) evaluation decides whether to switch.
    fn less_loaded_candidate_exists(
        &self,
        producer: &Endpoint,
        kind: ResourceKind,
        current: EndpointId,
        registry: &EndpointRegistry,
    ) -> bool {
        let current_load = self.delivery_load(current);
        registry
            .consumers_of(kind)
            .any(|e| e.id != current && e.id != producer.id && self.delivery_load(e.id) < current_load)
    }

    /// Next consumer in id order after `current`, skipping nearly full ones.
    fn next_rotation_target(
        &self,
        producer: &Endpoint,
        kind: ResourceKind,
        current: Option<EndpointId>,
        registry: &EndpointRegistry,
        graph: &RoadGraph,
        config: &LogisticsConfig,
    ) -> Option<RouteAssignment> {
        let sources = road_access_cells(graph, &producer.footprint, config.max_access_radius);
        if sources.is_empty() {
            return None;
        }
        let dmap = distances(graph, &sources, config.distance_horizon);

        let mut ring: Vec<(EndpointId, u32)> = registry
            .consumers_of(kind)
            .filter(|e| e.id != producer.id)
            .filter(|e| {
                e.fill_ratio(kind)
                    .is_none_or(|f| f < config.multiplex_skip_fill)
            })
            .filter_map(|e| {
                let d = road_access_cells(graph, &e.footprint, config.max_access_radius)
                    .iter()
                    .filter_map(|c| dmap.get(c))
                    .min()
                    .copied()?;
                Some((e.id, d))
            })
            .collect();
        ring.sort_unstable_by_key(|&(id, _)| id);
        if ring.is_empty() {
            return None;
        }

        let next = match current {
            Some(cur) => ring
                .iter()
                .find(|&&(id, _)| id > cur)
                .or_else(|| ring.first()),
            None => ring.first(),
        }?;
        Some(RouteAssignment { counterpart: next.0, distance: next.1 })
    }

    // ── Load bookkeeping ──────────────────────────────────────────────────

    fn set_outbound(&mut self, id: EndpointId, assignment: Option<RouteAssignment>) {
        let row = self.rows.entry(id).or_default();
        if row.outbound.map(|a| a.counterpart) == assignment.map(|a| a.counterpart) {
            row.outbound = assignment; // distance may have changed
            return;
        }
        if let Some(old) = row.outbound {
            decrement(&mut self.dest_load, old.counterpart);
        }
        if let Some(new) = assignment {
            *self.dest_load.entry(new.counterpart).or_insert(0) += 1;
        }
        row.outbound = assignment;
        row.deliveries_since_rotation = 0;
    }

    fn set_inbound(&mut self, id: EndpointId, assignment: Option<RouteAssignment>) {
        let row = self.rows.entry(id).or_default();
        if row.inbound.map(|a| a.counterpart) == assignment.map(|a| a.counterpart) {
            row.inbound = assignment;
            return;
        }
        if let Some(old) = row.inbound {
            decrement(&mut self.source_load, old.counterpart);
        }
        if let Some(new) = assignment {
            *self.source_load.entry(new.counterpart).or_insert(0) += 1;
        }
        row.inbound = assignment;
    }
}

fn decrement(map: &mut FxHashMap<EndpointId, u32>, id: EndpointId) {
    if let Some(n) = map.get_mut(&id) {
        *n = n.saturating_sub(1);
        if *n == 0 {
            map.remove(&id);
        }
    }
}

/// Strict ranking: load, then fill, then distance, then id.
fn pick_best(mut candidates: Vec<Candidate>) -> Option<Candidate> {
    candidates.sort_by(|a, b| {
        a.load
            .cmp(&b.load)
            .then_with(|| a.fill.total_cmp(&b.fill))
            .then_with(|| a.distance.cmp(&b.distance))
            .then_with(|| a.id.cmp(&b.id))
    });
    candidates.into_iter().next()
}
