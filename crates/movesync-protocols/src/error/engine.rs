//! Recommendation service errors.

use thiserror::Error;

/// A failed request against the recommendation service.
///
/// Every variant counts as one failure for retry purposes.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Engine reported error: {0}")]
    Service(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}
