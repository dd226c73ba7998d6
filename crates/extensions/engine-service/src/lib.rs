//! Move recommendation service.
//!
//! Answers `POST /` with `{"moves": [...]}` (moves as displayed by the page,
//! SAN with optional figurines) by replaying them from the start position and
//! asking a UCI engine for the best reply.

mod error;
mod notation;
mod server;
mod uci;

use std::future::Future;
use std::sync::Arc;

use tracing::info;

use movesync_config::ServiceConfig;

pub use error::ServiceError;
pub use notation::{normalize_figurines, san_to_uci};
pub use server::{ServiceState, create_router};
pub use uci::{MoveEngine, UciEngine, UciSession, parse_bestmove, position_command};

/// Spawn the engine and serve until `shutdown` resolves.
pub async fn run<F>(config: &ServiceConfig, shutdown: F) -> Result<(), ServiceError>
where
    F: Future<Output = ()> + Send + 'static,
{
    log_configuration(config);

    let engine = UciEngine::spawn(config).await?;
    let state = Arc::new(ServiceState::new(Arc::new(engine)));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Recommendation service listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Recommendation service stopped");
    Ok(())
}

fn log_configuration(config: &ServiceConfig) {
    info!("=== Engine Configuration ===");
    info!("Engine: {}", config.engine_path);
    info!("Thinking time: {} ms", config.movetime_ms);
    info!("Threads: {}", config.threads);
    info!("Hash size: {} MB", config.hash_mb);
    info!("============================");
}
