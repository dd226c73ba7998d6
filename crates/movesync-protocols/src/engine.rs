//! Recommendation service protocol.
//!
//! Wire format: `POST` with `{"moves": [...]}`; the reply is one of
//! `{"best_move": "e2e4"}`, `{"best_move": {"uci": "e2e4", ...}}` or
//! `{"error": "..."}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::moves::{MoveNotation, MoveSequence};

/// Request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineRequest {
    pub moves: MoveSequence,
}

/// Recommended move, either bare or as an object carrying a `uci` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BestMove {
    Uci(String),
    Detailed {
        uci: String,
        #[serde(flatten)]
        extra: serde_json::Map<String, serde_json::Value>,
    },
}

impl BestMove {
    pub fn uci(&self) -> &str {
        match self {
            BestMove::Uci(m) => m,
            BestMove::Detailed { uci, .. } => uci,
        }
    }
}

/// Response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_move: Option<BestMove>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EngineReply {
    pub fn best_move(mv: impl Into<String>) -> Self {
        Self {
            best_move: Some(BestMove::Uci(mv.into())),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            best_move: None,
            error: Some(message.into()),
        }
    }

    /// Resolve the reply to a move. An `error` field wins over `best_move`.
    pub fn into_move(self) -> Result<MoveNotation, EngineError> {
        if let Some(message) = self.error {
            return Err(EngineError::Service(message));
        }
        match self.best_move {
            Some(best) => Ok(best.uci().to_string()),
            None => Err(EngineError::InvalidResponse(
                "reply has neither best_move nor error".to_string(),
            )),
        }
    }
}

/// One request against the recommendation service, without retry.
#[async_trait]
pub trait MoveRecommender: Send + Sync {
    async fn recommend(&self, moves: &MoveSequence) -> Result<MoveNotation, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialize() {
        let req = EngineRequest {
            moves: MoveSequence::from(&["e4", "e5"][..]),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"moves":["e4","e5"]}"#);
    }

    #[test]
    fn test_reply_string_form() {
        let reply: EngineReply = serde_json::from_str(r#"{"best_move": "e2e4"}"#).unwrap();
        assert_eq!(reply.into_move().unwrap(), "e2e4");
    }

    #[test]
    fn test_reply_object_form() {
        let reply: EngineReply =
            serde_json::from_str(r#"{"best_move": {"uci": "e2e4", "san": "e4"}}"#).unwrap();
        assert_eq!(reply.into_move().unwrap(), "e2e4");
    }

    #[test]
    fn test_reply_error_field() {
        let reply: EngineReply = serde_json::from_str(r#"{"error": "no moves"}"#).unwrap();
        let err = reply.into_move().unwrap_err();
        assert!(matches!(err, EngineError::Service(ref m) if m == "no moves"));
    }

    #[test]
    fn test_reply_error_wins_over_move() {
        let reply: EngineReply =
            serde_json::from_str(r#"{"best_move": "e2e4", "error": "stale"}"#).unwrap();
        assert!(reply.into_move().is_err());
    }

    #[test]
    fn test_reply_empty() {
        let reply: EngineReply = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            reply.into_move(),
            Err(EngineError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_reply_serialize_skips_none() {
        let json = serde_json::to_string(&EngineReply::best_move("g1f3")).unwrap();
        assert_eq!(json, r#"{"best_move":"g1f3"}"#);
        let json = serde_json::to_string(&EngineReply::error("Invalid input")).unwrap();
        assert_eq!(json, r#"{"error":"Invalid input"}"#);
    }
}
