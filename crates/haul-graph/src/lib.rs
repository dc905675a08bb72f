//! `haul-graph` — road network graph and path queries.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`network`] | `RoadGraph` (incremental adjacency), `RoadEvent`           |
//! | [`query`]   | `distances`, `reconstruct_path`, `road_access_cells`       |
//! | [`planner`] | `plan_segment` — straight/bend fast path + best-first      |
//!
//! # Error model
//!
//! Unreachability is a normal outcome here, not an error: queries return
//! `Option`/empty maps.  Structural anomalies (predecessor cycles, ceiling
//! hits) are logged via `tracing` and also degrade to "no path" — nothing in
//! this crate panics on malformed search state.

pub mod network;
pub mod planner;
pub mod query;


pub use network::{RoadEvent, RoadGraph};
pub use planner::plan_segment;
pub use query::{distances, reconstruct_path, road_access_cells};
