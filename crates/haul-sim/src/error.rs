//! Orchestrator error type.

use thiserror::Error;

/// Errors surfaced by the simulation surface.  Per-tick logistics failures
/// never reach this type; they degrade to retry-later behavior inside the
/// subsystems.  This covers construction-time and world-mutation problems.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Haul(#[from] haul_core::HaulError),

    #[error(transparent)]
    World(#[from] haul_world::WorldError),

    #[error("delivery log error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for the orchestrator.
pub type SimResult<T> = Result<T, SimError>;
