//! HTTP client for the relay, used by the interactive chat command.

use crate::relay::protocol::{ChatEnvelope, ChatRequest};
use std::time::Duration;

/// Thin client for the relay's `/api/chat` endpoint.
#[derive(Clone)]
pub struct RelayClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum RelayClientError {
    #[error("relay request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("relay error: {status} {error}")]
    Relay {
        status: reqwest::StatusCode,
        error: String,
    },
}

impl RelayClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// POST /api/chat — one message out, normalized envelope back.
    pub async fn send(&self, message: &str) -> Result<ChatEnvelope, RelayClientError> {
        let url = format!("{}/api/chat", self.base_url);
        let res = self
            .client
            .post(&url)
            .json(&ChatRequest {
                message: message.to_string(),
            })
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let envelope: ChatEnvelope = res.json().await.unwrap_or_default();
            return Err(RelayClientError::Relay {
                status,
                error: envelope.error.unwrap_or_default(),
            });
        }
        let envelope: ChatEnvelope = res.json().await?;
        Ok(envelope)
    }
}
