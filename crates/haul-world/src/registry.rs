//! `EndpointRegistry` — slab storage with O(1) membership.
//!
//! # Why a slab
//!
//! Endpoints are created and destroyed throughout a run, and several
//! subsystems (routing engine, request board, haulers) hold `EndpointId`s
//! across ticks.  A slab gives O(1) insert, remove, and lookup while keeping
//! IDs stable for the lifetime of the endpoint; a freed slot is reused by a
//! later insertion, at which point the old ID simply resolves to the new
//! occupant's — callers that cache IDs must treat `get() == None` and a
//! changed occupant identically, which they already do because every lookup
//! re-validates against the registry each tick.

use haul_core::{EndpointId, ResourceKind};

use crate::endpoint::Endpoint;

/// O(1) endpoint storage, indexed by `EndpointId`.
#[derive(Default)]
pub struct EndpointRegistry {
    slots: Vec<Option<Endpoint>>,
    free: Vec<u32>,
    len: usize,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `endpoint`, assign its ID, and return it.
    pub fn insert(&mut self, mut endpoint: Endpoint) -> EndpointId {
        let id = match self.free.pop() {
            Some(slot) => EndpointId(slot),
            None => {
                self.slots.push(None);
                EndpointId((self.slots.len() - 1) as u32)
            }
        };
        endpoint.id = id;
        self.slots[id.index()] = Some(endpoint);
        self.len += 1;
        id
    }

    /// Remove and return the endpoint at `id`, freeing the slot.
    pub fn remove(&mut self, id: EndpointId) -> Option<Endpoint> {
        let slot = self.slots.get_mut(id.index())?;
        let endpoint = slot.take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(endpoint)
    }

    #[inline]
    pub fn contains(&self, id: EndpointId) -> bool {
        self.slots
            .get(id.index())
            .is_some_and(|s| s.is_some())
    }

    #[inline]
    pub fn get(&self, id: EndpointId) -> Option<&Endpoint> {
        self.slots.get(id.index())?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: EndpointId) -> Option<&mut Endpoint> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate live endpoints in ascending slot order (deterministic).
    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }

    // ── Capability scans used by the routing engine ───────────────────────

    /// Live producers whose output pile holds `kind`.
    pub fn producers_of(&self, kind: ResourceKind) -> impl Iterator<Item = &Endpoint> {
        self.iter()
            .filter(move |e| e.produced_kind() == Some(kind))
    }

    /// Live consumers with an input slot for `kind`.
    pub fn consumers_of(&self, kind: ResourceKind) -> impl Iterator<Item = &Endpoint> {
        self.iter().filter(move |e| e.needs(kind))
    }

    /// Live storage depots.
    pub fn depots(&self) -> impl Iterator<Item = &Endpoint> {
        self.iter().filter(|e| e.is_depot())
    }

    pub fn count_producers(&self, kind: ResourceKind) -> usize {
        self.producers_of(kind).count()
    }

    pub fn count_consumers(&self, kind: ResourceKind) -> usize {
        self.consumers_of(kind).count()
    }
}
