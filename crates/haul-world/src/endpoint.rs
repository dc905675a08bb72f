//! The `Endpoint` type — a producer, consumer, or storage depot identified by
//! its grid footprint.
//!
//! An endpoint owns up to three buffers: an output pile (producers), an input
//! store (consumers — including producers that consume raw materials), and a
//! depot store (warehouses).  The capability queries below are what the
//! routing engine and the request board interrogate; they never look inside
//! the buffers directly.

use haul_core::{EndpointId, Footprint, ResourceKind};

use crate::buffers::{DepotStore, InputStore, OutputStock};

/// A production/consumption/storage location on the grid.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Endpoint {
    /// Assigned by the registry on insertion; `INVALID` before that.
    pub id: EndpointId,
    pub footprint: Footprint,
    pub output: Option<OutputStock>,
    pub input: Option<InputStore>,
    pub depot: Option<DepotStore>,
}

impl Endpoint {
    pub fn new(footprint: Footprint) -> Self {
        Self {
            id: EndpointId::INVALID,
            footprint,
            output: None,
            input: None,
            depot: None,
        }
    }

    // ── Construction helpers ──────────────────────────────────────────────

    /// A pure producer of `kind`.
    pub fn producer(footprint: Footprint, kind: ResourceKind, capacity: u32) -> Self {
        Self::new(footprint).with_output(OutputStock::new(kind, capacity))
    }

    /// A pure consumer with the given input slots.
    pub fn consumer(footprint: Footprint, slots: &[(ResourceKind, u32)]) -> Self {
        Self::new(footprint).with_input(InputStore::new(slots))
    }

    /// A storage depot accepting every kind.
    pub fn depot(footprint: Footprint, capacity_per_kind: u32) -> Self {
        Self::new(footprint).with_depot(DepotStore::new(capacity_per_kind))
    }

    pub fn with_output(mut self, output: OutputStock) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_input(mut self, input: InputStore) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_depot(mut self, depot: DepotStore) -> Self {
        self.depot = Some(depot);
        self
    }

    // ── Capability queries ────────────────────────────────────────────────

    #[inline]
    pub fn is_depot(&self) -> bool {
        self.depot.is_some()
    }

    /// The kind this endpoint produces, if it has an output pile at all.
    pub fn produced_kind(&self) -> Option<ResourceKind> {
        self.output.as_ref().map(|o| o.kind)
    }

    /// `true` if at least one unit of `kind` can be withdrawn right now.
    pub fn provides(&self, kind: ResourceKind) -> bool {
        self.available(kind) > 0
    }

    /// `true` if this endpoint has an input slot for `kind` (it consumes it).
    /// Depot storage does not count as "needing" — depots are delivery
    /// fallbacks, not demand.
    pub fn needs(&self, kind: ResourceKind) -> bool {
        self.input.as_ref().is_some_and(|i| i.takes(kind))
    }

    /// Units of `kind` withdrawable right now (output pile first, then depot).
    pub fn available(&self, kind: ResourceKind) -> u32 {
        let from_output = match &self.output {
            Some(o) if o.kind == kind => o.available(),
            _ => 0,
        };
        let from_depot = self.depot.as_ref().map_or(0, |d| d.amount(kind));
        from_output + from_depot
    }

    /// Units of `kind` this endpoint can accept in a delivery (input slot
    /// first, then depot storage).
    pub fn delivery_space(&self, kind: ResourceKind) -> u32 {
        let input = self.input.as_ref().map_or(0, |i| i.space_for(kind));
        let depot = self.depot.as_ref().map_or(0, |d| d.space_for(kind));
        input + depot
    }

    /// Fill ratio for `kind` as seen by the routing engine: the input slot's
    /// ratio when one exists, otherwise the depot's.
    pub fn fill_ratio(&self, kind: ResourceKind) -> Option<f32> {
        if let Some(input) = &self.input {
            if let Some(r) = input.fill_ratio(kind) {
                return Some(r);
            }
        }
        self.depot.as_ref().map(|d| d.fill_ratio(kind))
    }

    // ── Transfers ─────────────────────────────────────────────────────────

    /// Withdraw up to `n` units of `kind`; output pile drains before depot
    /// stock.  Returns the amount taken.
    pub fn withdraw(&mut self, kind: ResourceKind, n: u32) -> u32 {
        let mut taken = 0;
        if let Some(output) = &mut self.output {
            if output.kind == kind {
                taken += output.withdraw(n);
            }
        }
        if taken < n {
            if let Some(depot) = &mut self.depot {
                taken += depot.withdraw(kind, n - taken);
            }
        }
        taken
    }

    /// Deposit up to `n` units of `kind`; input slots fill before depot
    /// storage.  Returns the amount accepted.
    pub fn deposit(&mut self, kind: ResourceKind, n: u32) -> u32 {
        let mut accepted = 0;
        if let Some(input) = &mut self.input {
            accepted += input.deposit(kind, n);
        }
        if accepted < n {
            if let Some(depot) = &mut self.depot {
                accepted += depot.deposit(kind, n - accepted);
            }
        }
        accepted
    }

    /// Return undelivered output cargo to this endpoint's own pile.
    ///
    /// Falls back to `deposit` when the kind doesn't match the pile (or the
    /// pile overflowed), so returned goods are never silently dropped by the
    /// caller's accounting — whatever this returns as accepted stays here.
    pub fn restock_output(&mut self, kind: ResourceKind, n: u32) -> u32 {
        let mut accepted = 0;
        if let Some(output) = &mut self.output {
            if output.kind == kind {
                accepted += output.deposit(n);
            }
        }
        if accepted < n {
            accepted += self.deposit(kind, n - accepted);
        }
        accepted
    }
}
