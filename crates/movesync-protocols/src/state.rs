//! Controller state as seen by a UI collaborator.

use serde::{Deserialize, Serialize};

/// Bot controller state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotState {
    /// No subscription, no pending cycle.
    #[default]
    Idle,
    /// Subscription active, cycles may be in flight.
    Running,
    /// Subscription released after a failure; left only via `start()`.
    Error,
}

impl std::fmt::Display for BotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotState::Idle => write!(f, "idle"),
            BotState::Running => write!(f, "running"),
            BotState::Error => write!(f, "error"),
        }
    }
}

/// Status update published to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotStatus {
    pub status: BotState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl BotStatus {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn running() -> Self {
        Self {
            status: BotState::Running,
            last_error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: BotState::Error,
            last_error: Some(message.into()),
        }
    }
}
