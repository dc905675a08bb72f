//! Multi-slot cargo hold.
//!
//! A hauler owns a small fixed array of slots; each slot holds one resource
//! kind at a time, up to a fixed per-slot capacity.  Loading fills partially
//! filled slots of the same kind before opening a fresh slot, so a hold never
//! fragments one kind across more slots than necessary.

use haul_core::ResourceKind;

/// One fixed-capacity, single-kind compartment.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CargoSlot {
    pub kind: Option<ResourceKind>,
    pub amount: u32,
}

/// The full hold: a fixed number of slots sharing one per-slot capacity.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CargoHold {
    slots: Vec<CargoSlot>,
    slot_capacity: u32,
}

impl CargoHold {
    pub fn new(slot_count: usize, slot_capacity: u32) -> Self {
        Self {
            slots: vec![CargoSlot::default(); slot_count],
            slot_capacity,
        }
    }

    #[inline]
    pub fn slot_capacity(&self) -> u32 {
        self.slot_capacity
    }

    pub fn slots(&self) -> &[CargoSlot] {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.amount == 0)
    }

    /// Total units across all slots, any kind.
    pub fn total(&self) -> u32 {
        self.slots.iter().map(|s| s.amount).sum()
    }

    /// Units of `kind` currently held.
    pub fn carried(&self, kind: ResourceKind) -> u32 {
        self.slots
            .iter()
            .filter(|s| s.kind == Some(kind))
            .map(|s| s.amount)
            .sum()
    }

    /// Distinct kinds with at least one unit aboard, in slot order.
    pub fn kinds(&self) -> Vec<ResourceKind> {
        let mut out = Vec::new();
        for slot in &self.slots {
            if slot.amount > 0 {
                if let Some(kind) = slot.kind {
                    if !out.contains(&kind) {
                        out.push(kind);
                    }
                }
            }
        }
        out
    }

    /// Units of `kind` the hold could still accept.
    pub fn free_for(&self, kind: ResourceKind) -> u32 {
        self.slots
            .iter()
            .map(|s| match s.kind {
                Some(k) if k == kind => self.slot_capacity - s.amount,
                None if s.amount == 0 => self.slot_capacity,
                _ => 0,
            })
            .sum()
    }

    /// Load up to `n` units of `kind`; returns the amount accepted.
    pub fn load(&mut self, kind: ResourceKind, n: u32) -> u32 {
        let mut remaining = n;
        // Top up matching slots first.
        for slot in &mut self.slots {
            if remaining == 0 {
                break;
            }
            if slot.kind == Some(kind) && slot.amount < self.slot_capacity {
                let take = remaining.min(self.slot_capacity - slot.amount);
                slot.amount += take;
                remaining -= take;
            }
        }
        // Then open empty slots.
        for slot in &mut self.slots {
            if remaining == 0 {
                break;
            }
            if slot.amount == 0 {
                slot.kind = Some(kind);
                let take = remaining.min(self.slot_capacity);
                slot.amount = take;
                remaining -= take;
            }
        }
        n - remaining
    }

    /// Remove up to `n` units of `kind`; returns the amount taken.  Emptied
    /// slots are released for reuse by any kind.
    pub fn unload(&mut self, kind: ResourceKind, n: u32) -> u32 {
        let mut remaining = n;
        for slot in &mut self.slots {
            if remaining == 0 {
                break;
            }
            if slot.kind == Some(kind) {
                let take = remaining.min(slot.amount);
                slot.amount -= take;
                remaining -= take;
                if slot.amount == 0 {
                    slot.kind = None;
                }
            }
        }
        n - remaining
    }
}
