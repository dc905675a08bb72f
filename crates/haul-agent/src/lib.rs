//! `haul-agent` — transport agents that physically move cargo.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                     |
//! |-----------|--------------------------------------------------------------|
//! | [`cargo`] | `CargoHold`, `CargoSlot` — multi-slot single-kind storage    |
//! | [`state`] | `HaulState`, `Leg`, `Timer` — FSM states and travel/timing   |
//! | [`fleet`] | `Hauler`, `HaulerFleet` — slab storage and the tick driver   |
//!
//! Agents hold only identifiers (home, target); every endpoint access
//! re-resolves through the registry, so a destroyed counterpart is detected
//! at the next touch and degrades to the recovery path instead of dangling.

pub mod cargo;
pub mod fleet;
pub mod state;


pub use cargo::{CargoHold, CargoSlot};
pub use fleet::{DeliveryRecord, Hauler, HaulerFleet};
pub use state::{HaulState, Leg, Timer};
