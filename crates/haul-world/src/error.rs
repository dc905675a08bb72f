//! World-subsystem error type.

use thiserror::Error;

use haul_core::CellCoord;

/// Errors produced by `haul-world`.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("cell {0} is already occupied by a building")]
    CellOccupied(CellCoord),

    #[error("cell {0} already carries a road segment")]
    RoadPresent(CellCoord),
}

pub type WorldResult<T> = Result<T, WorldError>;
