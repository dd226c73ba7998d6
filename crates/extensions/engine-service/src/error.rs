//! Service error types.

use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use movesync_protocols::EngineReply;

/// Recommendation service errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Body is not `{"moves": [string, ...]}`.
    #[error("Invalid input")]
    InvalidInput,

    #[error("Illegal move '{notation}' at ply {ply}: {reason}")]
    IllegalMove {
        ply: usize,
        notation: String,
        reason: String,
    },

    /// The engine has no legal reply.
    #[error("No move found")]
    NoMove,

    #[error("Failed to start engine '{path}': {source}")]
    Spawn {
        path: String,
        source: std::io::Error,
    },

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Engine did not answer within {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::InvalidInput | ServiceError::IllegalMove { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status(), Json(EngineReply::error(self.to_string()))).into_response()
    }
}
