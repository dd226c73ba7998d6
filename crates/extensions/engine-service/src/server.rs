//! HTTP routing.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use movesync_protocols::{EngineReply, EngineRequest};

use crate::error::ServiceError;
use crate::notation;
use crate::uci::MoveEngine;

/// Shared handler state.
pub struct ServiceState {
    engine: Arc<dyn MoveEngine>,
}

impl ServiceState {
    pub fn new(engine: Arc<dyn MoveEngine>) -> Self {
        Self { engine }
    }
}

/// Create the service router.
pub fn create_router(state: Arc<ServiceState>) -> Router {
    Router::new()
        .route("/", post(recommend))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `{"moves": [...]}` → `{"best_move": "..."}`.
async fn recommend(
    State(state): State<Arc<ServiceState>>,
    body: Bytes,
) -> Result<Json<EngineReply>, ServiceError> {
    let request: EngineRequest =
        serde_json::from_slice(&body).map_err(|_| ServiceError::InvalidInput)?;
    let moves = request.moves.into_inner();
    debug!("Move request with {} plies", moves.len());

    let uci_moves = notation::san_to_uci(&moves)?;
    let best_move = state
        .engine
        .best_move(&uci_moves)
        .await?
        .ok_or(ServiceError::NoMove)?;

    info!("Best move after {} plies: {}", moves.len(), best_move);
    Ok(Json(EngineReply::best_move(best_move)))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
