//! `haul-sim` — the orchestrator tying the logistics subsystems together.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`sim`]      | `Sim` — phase-ordered tick loop and the mutation surface |
//! | [`builder`]  | `SimBuilder` — declarative world setup                   |
//! | [`observer`] | `SimObserver`, `NoopObserver`, CSV `DeliveryLog`         |
//! | [`error`]    | `SimError`, `SimResult<T>`                               |
//!
//! # Minimal usage
//!
//! ```no_run
//! use haul_core::{CellCoord, Footprint, LogisticsConfig, ResourceKind};
//! use haul_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new()
//!     .config(LogisticsConfig::default())
//!     .road_line(CellCoord::new(0, 0), CellCoord::new(8, 0))
//!     .producer(Footprint::single(CellCoord::new(0, 1)), ResourceKind::Wood, 50, 50)
//!     .with_hauler()
//!     .consumer(Footprint::single(CellCoord::new(8, 1)), &[(ResourceKind::Wood, 20)])
//!     .build()?;
//! sim.run_ticks(500, &mut NoopObserver);
//! # Ok::<(), haul_sim::SimError>(())
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{DeliveryLog, NoopObserver, SimObserver};
pub use sim::Sim;
