//! Relay wire types: the chat request and the normalized response envelope.

use serde::{Deserialize, Serialize};

/// Caller request: `{ "message": string }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Normalized relay response: `{ "message"?: string }` on success or
/// `{ "error": string }` on failure. Never both; a 2xx never carries `error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatEnvelope {
    pub fn reply(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            error: None,
        }
    }

    /// Success with no reply text (no recognizable field upstream);
    /// the client renders its no-content fallback.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            message: None,
            error: Some(error.into()),
        }
    }
}
