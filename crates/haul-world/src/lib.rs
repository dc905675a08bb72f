//! `haul-world` — endpoints, storage buffers, and the world grid.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`buffers`]  | `OutputStock`, `InputStore`/`InputSlot`, `DepotStore`     |
//! | [`endpoint`] | `Endpoint` and its capability queries                     |
//! | [`registry`] | `EndpointRegistry` — O(1) slab with insertion/removal     |
//! | [`grid`]     | `GridMap` — cell occupancy, road presence, speed          |
//! | [`error`]    | `WorldError`, `WorldResult<T>`                            |
//!
//! Buffer internals deliberately stay simple: the logistics subsystem only
//! relies on the withdraw/deposit surface (both return the amount actually
//! moved) and on fill ratios.  Production logic that refills `OutputStock`
//! belongs to the host simulation, not this workspace.

pub mod buffers;
pub mod endpoint;
pub mod error;
pub mod grid;
pub mod registry;

#[cfg(test)]
mod tests;

pub use buffers::{DepotStore, InputSlot, InputStore, OutputStock};
pub use endpoint::Endpoint;
pub use error::{WorldError, WorldResult};
pub use grid::GridMap;
pub use registry::EndpointRegistry;
