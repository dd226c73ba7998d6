//! CDP error types.

use thiserror::Error;

use movesync_protocols::HostError;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not found or not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Error object returned for a command.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error during endpoint discovery.
    #[error("HTTP error: {0}")]
    Http(String),

    /// No open tab matched.
    #[error("No page matching '{0}'")]
    PageNotFound(String),

    /// Exception thrown by evaluated script.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// The WebSocket closed before a reply arrived.
    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CdpError {
    /// The referenced remote object no longer exists in the page.
    pub fn is_stale_object(&self) -> bool {
        matches!(self, CdpError::Protocol { message, .. } if message.contains("Could not find object"))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for HostError {
    fn from(e: CdpError) -> Self {
        match e {
            e if e.is_stale_object() => HostError::ElementNotFound(e.to_string()),
            CdpError::JavaScript(message) => HostError::Script(message),
            CdpError::Protocol { .. } => HostError::Script(e.to_string()),
            CdpError::Serialization(_) | CdpError::InvalidResponse(_) => {
                HostError::Malformed(e.to_string())
            }
            other => HostError::Unavailable(other.to_string()),
        }
    }
}
