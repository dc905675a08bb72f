//! `haul-routing` — route assignment and the restock request board.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                    |
//! |------------|-------------------------------------------------------------|
//! | [`engine`] | `RoutingEngine`, `RouteAssignment`, `RouteMode`             |
//! | [`board`]  | `RequestBoard`, `ResourceRequest`                           |
//!
//! The two halves are independent by design: the engine pairs producers and
//! consumers (or depot fallbacks) for standing routes, while the board
//! matches depot stock against acute restock requests.  A consumer can be
//! served by both at once — a standing route from a producer plus a one-off
//! depot top-up when it runs critically low.

pub mod board;
pub mod engine;

#[cfg(test)]
mod tests;

pub use board::{RequestBoard, ResourceRequest};
pub use engine::{RouteAssignment, RouteMode, RoutingEngine};
