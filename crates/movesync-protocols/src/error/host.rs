//! Host document errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Host unavailable: {0}")]
    Unavailable(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Malformed host data: {0}")]
    Malformed(String),

    #[error("Subscription not found: {0}")]
    UnknownSubscription(String),
}

impl HostError {
    /// Whether the error means the element the caller asked for is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, HostError::ElementNotFound(_))
    }
}
