//! Framework error type.
//!
//! Sub-crates may define their own error enums and convert them into
//! `HaulError` via `From` impls, or keep them separate and wrap `HaulError`
//! as one variant.  Both patterns are acceptable; prefer whichever keeps
//! error sites clean.
//!
//! Note that "unreachable" and "no candidate" outcomes are **not** errors
//! anywhere in this workspace — they surface as `Option`/empty collections
//! and degrade to retry-later behavior.

use thiserror::Error;

use crate::{EndpointId, HaulerId};

/// The top-level error type for `haul-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum HaulError {
    #[error("endpoint {0} not found")]
    EndpointNotFound(EndpointId),

    #[error("hauler {0} not found")]
    HaulerNotFound(HaulerId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `haul-*` crates.
pub type HaulResult<T> = Result<T, HaulError>;
