//! HTTP client for the recommendation service.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace};

use movesync_config::EngineConfig;
use movesync_protocols::{EngineError, EngineReply, EngineRequest, MoveNotation, MoveRecommender, MoveSequence};

/// Sends one `POST` per call; retries are the caller's business.
pub struct EngineClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl EngineClient {
    /// Create a client for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Create a client from configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.endpoint.clone()).with_timeout(Duration::from_secs(config.timeout_seconds))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_send_error(&self, e: reqwest::Error) -> EngineError {
        if e.is_timeout() {
            EngineError::Timeout(self.timeout.as_secs())
        } else {
            EngineError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl MoveRecommender for EngineClient {
    async fn recommend(&self, moves: &MoveSequence) -> Result<MoveNotation, EngineError> {
        let request = EngineRequest {
            moves: moves.clone(),
        };
        debug!("Requesting recommendation for {} moves from {}", moves.len(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        trace!("Engine reply ({}): {}", status, body);

        if !status.is_success() {
            let message = serde_json::from_str::<EngineReply>(&body)
                .ok()
                .and_then(|reply| reply.error)
                .unwrap_or(body);
            return Err(EngineError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let reply: EngineReply = serde_json::from_str(&body)
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;
        reply.into_move()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
