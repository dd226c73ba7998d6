//! Cycle error types.

use thiserror::Error;

use movesync_protocols::HostError;

/// Move extraction errors.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Malformed ply #{index}: {reason}")]
    MalformedPly { index: usize, reason: String },

    #[error(transparent)]
    Host(#[from] HostError),
}

/// Move injection errors.
#[derive(Debug, Error)]
pub enum InjectError {
    #[error("Move input not found")]
    InputNotFound,

    #[error(transparent)]
    Host(#[from] HostError),
}
