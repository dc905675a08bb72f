//! `haul-core` — foundational types for the `rust_haul` logistics framework.
//!
//! This crate is a dependency of every other `haul-*` crate.  It intentionally
//! has no `haul-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                              |
//! |--------------|-------------------------------------------------------|
//! | [`ids`]      | `EndpointId`, `HaulerId`                              |
//! | [`cell`]     | `CellCoord`, `Direction`, `Rotation`, `Footprint`     |
//! | [`resource`] | `ResourceKind` enum                                   |
//! | [`time`]     | `Tick`                                                |
//! | [`config`]   | `LogisticsConfig`, `PlannerCosts`                     |
//! | [`rng`]      | `SimRng`, deterministic `stagger` mixing              |
//! | [`error`]    | `HaulError`, `HaulResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod cell;
pub mod config;
pub mod error;
pub mod ids;
pub mod resource;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cell::{CellCoord, Direction, Footprint, Rotation};
pub use config::{LogisticsConfig, PlannerCosts};
pub use error::{HaulError, HaulResult};
pub use ids::{EndpointId, HaulerId};
pub use resource::ResourceKind;
pub use rng::{stagger, SimRng};
pub use time::Tick;
