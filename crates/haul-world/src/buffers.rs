//! Storage buffer types.
//!
//! Three shapes cover every endpoint in the simulation:
//!
//! - [`OutputStock`]: a single-kind pile of finished goods awaiting pickup.
//! - [`InputStore`]: a fixed set of per-kind input slots a building consumes
//!   from (a sawmill's wood slot, a toolmaker's ore and planks slots).
//! - [`DepotStore`]: generic multi-kind storage that accepts everything.
//!
//! All transfer methods follow one contract: `withdraw`/`deposit` return the
//! amount **actually moved**, clamped to availability or free space.  Callers
//! compare against the requested amount to detect partial transfers; nothing
//! here panics or errors on shortfall.

use haul_core::ResourceKind;

// ── OutputStock ───────────────────────────────────────────────────────────────

/// A producer's single-kind output pile.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutputStock {
    pub kind: ResourceKind,
    amount: u32,
    capacity: u32,
}

impl OutputStock {
    pub fn new(kind: ResourceKind, capacity: u32) -> Self {
        Self { kind, amount: 0, capacity }
    }

    /// Construct with an initial amount (test fixtures, pre-stocked worlds).
    pub fn with_amount(kind: ResourceKind, capacity: u32, amount: u32) -> Self {
        Self { kind, amount: amount.min(capacity), capacity }
    }

    #[inline]
    pub fn available(&self) -> u32 {
        self.amount
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }

    pub fn fill_ratio(&self) -> f32 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.amount as f32 / self.capacity as f32
    }

    /// Take up to `n` units; returns the amount taken.
    pub fn withdraw(&mut self, n: u32) -> u32 {
        let taken = n.min(self.amount);
        self.amount -= taken;
        taken
    }

    /// Add up to `n` units (production, or returned undeliverable cargo);
    /// returns the amount accepted.
    pub fn deposit(&mut self, n: u32) -> u32 {
        let accepted = n.min(self.capacity - self.amount);
        self.amount += accepted;
        accepted
    }
}

// ── InputStore ────────────────────────────────────────────────────────────────

/// One per-kind input compartment of an [`InputStore`].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputSlot {
    pub kind: ResourceKind,
    pub stored: u32,
    pub capacity: u32,
}

impl InputSlot {
    pub fn fill_ratio(&self) -> f32 {
        if self.capacity == 0 {
            return 1.0; // a zero-capacity slot can never be refilled
        }
        self.stored as f32 / self.capacity as f32
    }

    #[inline]
    pub fn space(&self) -> u32 {
        self.capacity - self.stored
    }
}

/// The set of materials a building consumes, one slot per kind.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputStore {
    slots: Vec<InputSlot>,
}

impl InputStore {
    /// Build from `(kind, capacity)` pairs.  Slot order is preserved and
    /// duplicate kinds are collapsed into the first occurrence.
    pub fn new(slots: &[(ResourceKind, u32)]) -> Self {
        let mut out: Vec<InputSlot> = Vec::with_capacity(slots.len());
        for &(kind, capacity) in slots {
            if !out.iter().any(|s| s.kind == kind) {
                out.push(InputSlot { kind, stored: 0, capacity });
            }
        }
        Self { slots: out }
    }

    pub fn slots(&self) -> &[InputSlot] {
        &self.slots
    }

    pub fn slot(&self, kind: ResourceKind) -> Option<&InputSlot> {
        self.slots.iter().find(|s| s.kind == kind)
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> Option<&mut InputSlot> {
        self.slots.iter_mut().find(|s| s.kind == kind)
    }

    /// `true` if the store has a slot for `kind` (regardless of fill).
    pub fn takes(&self, kind: ResourceKind) -> bool {
        self.slot(kind).is_some()
    }

    pub fn fill_ratio(&self, kind: ResourceKind) -> Option<f32> {
        self.slot(kind).map(InputSlot::fill_ratio)
    }

    pub fn space_for(&self, kind: ResourceKind) -> u32 {
        self.slot(kind).map_or(0, InputSlot::space)
    }

    /// Deposit up to `n` units of `kind`; returns the amount accepted
    /// (0 when no slot for `kind` exists).
    pub fn deposit(&mut self, kind: ResourceKind, n: u32) -> u32 {
        match self.slot_mut(kind) {
            None => 0,
            Some(slot) => {
                let accepted = n.min(slot.space());
                slot.stored += accepted;
                accepted
            }
        }
    }

    /// Withdraw up to `n` units of `kind`; returns the amount taken.
    /// Used when a destroyed hauler's cargo is returned to its home stores.
    pub fn withdraw(&mut self, kind: ResourceKind, n: u32) -> u32 {
        match self.slot_mut(kind) {
            None => 0,
            Some(slot) => {
                let taken = n.min(slot.stored);
                slot.stored -= taken;
                taken
            }
        }
    }

    /// The lowest fill ratio across all slots, or `None` for an empty store.
    pub fn min_fill_ratio(&self) -> Option<f32> {
        self.slots
            .iter()
            .map(InputSlot::fill_ratio)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Up to `k` slot kinds ranked by ascending fill ratio.
    ///
    /// Ties break on slot order, so the ranking is deterministic.  Slots that
    /// are already full are excluded.
    pub fn most_underfilled(&self, k: usize) -> Vec<ResourceKind> {
        let mut ranked: Vec<&InputSlot> =
            self.slots.iter().filter(|s| s.space() > 0).collect();
        ranked.sort_by(|a, b| a.fill_ratio().total_cmp(&b.fill_ratio()));
        ranked.into_iter().take(k).map(|s| s.kind).collect()
    }
}

// ── DepotStore ────────────────────────────────────────────────────────────────

/// Generic warehouse storage: every kind, one shared per-kind capacity.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DepotStore {
    stock: [u32; ResourceKind::COUNT],
    capacity_per_kind: u32,
}

impl DepotStore {
    pub fn new(capacity_per_kind: u32) -> Self {
        Self { stock: [0; ResourceKind::COUNT], capacity_per_kind }
    }

    #[inline]
    pub fn amount(&self, kind: ResourceKind) -> u32 {
        self.stock[kind.index()]
    }

    pub fn total(&self) -> u32 {
        self.stock.iter().sum()
    }

    pub fn space_for(&self, kind: ResourceKind) -> u32 {
        self.capacity_per_kind - self.stock[kind.index()]
    }

    pub fn fill_ratio(&self, kind: ResourceKind) -> f32 {
        if self.capacity_per_kind == 0 {
            return 1.0;
        }
        self.stock[kind.index()] as f32 / self.capacity_per_kind as f32
    }

    /// Mean fill across all kinds — the depot-wide load signal used when
    /// ranking depots as delivery fallbacks.
    pub fn mean_fill_ratio(&self) -> f32 {
        if self.capacity_per_kind == 0 {
            return 1.0;
        }
        let total: u32 = self.stock.iter().sum();
        total as f32 / (self.capacity_per_kind as f32 * ResourceKind::COUNT as f32)
    }

    pub fn deposit(&mut self, kind: ResourceKind, n: u32) -> u32 {
        let accepted = n.min(self.space_for(kind));
        self.stock[kind.index()] += accepted;
        accepted
    }

    pub fn withdraw(&mut self, kind: ResourceKind, n: u32) -> u32 {
        let taken = n.min(self.stock[kind.index()]);
        self.stock[kind.index()] -= taken;
        taken
    }
}
