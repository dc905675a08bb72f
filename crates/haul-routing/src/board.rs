//! The restock request board: acute shortages published by consumers, matched
//! against depot stock by idle depot haulers.
//!
//! The board complements the routing engine rather than replacing it.  A
//! standing route keeps a consumer supplied under normal operation; the board
//! catches the cases routes handle poorly — a consumer whose producer fell
//! behind, a freshly placed building with empty stores, a kind no producer
//! makes yet but a depot happens to hold.
//!
//! Registration uses hysteresis so requests don't flap: a slot registers when
//! it drops to the request threshold and only withdraws once it climbs past
//! the (much higher) clear threshold.

use std::collections::BTreeMap;

use haul_core::{CellCoord, EndpointId, LogisticsConfig, ResourceKind};
use haul_graph::{distances, road_access_cells, RoadGraph};
use haul_world::EndpointRegistry;

// ── ResourceRequest ───────────────────────────────────────────────────────────

/// One outstanding "bring me `kind`" entry on the board.
#[derive(Clone, Debug)]
pub struct ResourceRequest {
    pub requester: EndpointId,
    pub kind: ResourceKind,
    /// Urgency band 1..=5; 5 means the slot is (nearly) empty.
    pub priority: u8,
    /// Road cells adjacent to the requester, computed at sync time.  Empty
    /// when the requester has no road access yet; such requests stay on the
    /// board but cannot be matched until a road arrives.
    pub access: Vec<CellCoord>,
}

/// Map urgency to a 1..=5 band from how far below the registration threshold
/// the slot sits.  An empty slot is a 5; a slot right at the threshold is a 1.
fn priority_band(fill_ratio: f32, threshold: f32) -> u8 {
    if threshold <= 0.0 {
        return 1;
    }
    let frac = (fill_ratio / threshold).clamp(0.0, 1.0);
    1 + ((1.0 - frac) * 4.0).round() as u8
}

// ── RequestBoard ──────────────────────────────────────────────────────────────

/// All outstanding restock requests, keyed by `(requester, kind)`.
///
/// A `BTreeMap` keeps iteration order deterministic across runs.
#[derive(Default)]
pub struct RequestBoard {
    requests: BTreeMap<(EndpointId, ResourceKind), ResourceRequest>,
}

impl RequestBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn get(&self, requester: EndpointId, kind: ResourceKind) -> Option<&ResourceRequest> {
        self.requests.get(&(requester, kind))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceRequest> {
        self.requests.values()
    }

    /// Drop every request published by a destroyed endpoint.
    pub fn remove_requester(&mut self, id: EndpointId) {
        self.requests.retain(|&(r, _), _| r != id);
    }

    /// Reconcile the board with the current world state.
    ///
    /// Walks every input slot in the registry and applies the hysteresis
    /// rules: register at or below the fill threshold, withdraw at or above
    /// the clear threshold, keep (with refreshed priority and access cells)
    /// in between.  Requests whose endpoint or slot vanished are dropped.
    pub fn sync(
        &mut self,
        registry: &EndpointRegistry,
        graph: &RoadGraph,
        config: &LogisticsConfig,
    ) {
        // Drop entries whose endpoint or slot no longer exists.
        self.requests.retain(|&(requester, kind), _| {
            registry.get(requester).is_some_and(|e| e.needs(kind))
        });

        for endpoint in registry.iter() {
            let Some(input) = &endpoint.input else {
                continue;
            };
            let access = road_access_cells(graph, &endpoint.footprint, config.max_access_radius);
            for slot in input.slots() {
                let key = (endpoint.id, slot.kind);
                let ratio = slot.fill_ratio();
                let registered = self.requests.contains_key(&key);

                if !registered {
                    if ratio <= config.request_fill_threshold {
                        self.requests.insert(
                            key,
                            ResourceRequest {
                                requester: endpoint.id,
                                kind: slot.kind,
                                priority: priority_band(ratio, config.request_fill_threshold),
                                access: access.clone(),
                            },
                        );
                    }
                } else if ratio >= config.request_clear_threshold {
                    self.requests.remove(&key);
                } else if let Some(request) = self.requests.get_mut(&key) {
                    request.priority = priority_band(ratio, config.request_fill_threshold);
                    request.access = access.clone();
                }
            }
        }
    }

    /// The best request for `kind` reachable from `from_cells` within
    /// `radius` road steps.
    ///
    /// Ranking is priority (descending), then road distance, then requester
    /// id.  Returns `None` when no matching request is reachable.
    pub fn best_request(
        &self,
        graph: &RoadGraph,
        from_cells: &[CellCoord],
        kind: ResourceKind,
        radius: u32,
    ) -> Option<&ResourceRequest> {
        if from_cells.is_empty() {
            return None;
        }
        let dmap = distances(graph, from_cells, radius);

        // Lower key wins: highest priority, then shortest distance, then id.
        let mut best: Option<((std::cmp::Reverse<u8>, u32, EndpointId), &ResourceRequest)> = None;
        for request in self.requests.values().filter(|r| r.kind == kind) {
            let Some(distance) = request
                .access
                .iter()
                .filter_map(|c| dmap.get(c))
                .min()
                .copied()
            else {
                continue;
            };
            let key = (std::cmp::Reverse(request.priority), distance, request.requester);
            if best.as_ref().is_none_or(|(k, _)| key < *k) {
                best = Some((key, request));
            }
        }
        best.map(|(_, r)| r)
    }
}
