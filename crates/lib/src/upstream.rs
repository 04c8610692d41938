//! Upstream agent API client.
//!
//! One hosted agent contract is addressed per process; base URL, auth scheme,
//! and field names all come from `UpstreamConfig`. One outbound POST per call,
//! no retries, explicit request timeout.

use crate::config::{UpstreamAuthMode, UpstreamConfig};
use serde_json::Value;
use std::time::Duration;

/// Client for the hosted agent HTTP API.
#[derive(Clone)]
pub struct AgentClient {
    base_url: String,
    agent_id: String,
    auth: UpstreamAuthMode,
    credential: String,
    request_field: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("agent api error: {status} {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Raw upstream success body. Providers name the reply field differently;
/// see `reply::first_reply_field` for extraction.
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub body: Value,
}

impl AgentClient {
    /// An absent credential is tolerated: the empty string is sent and the
    /// upstream rejects the call.
    pub fn new(upstream: &UpstreamConfig, credential: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(upstream.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: upstream.base_url.trim_end_matches('/').to_string(),
            agent_id: upstream.agent_id.clone(),
            auth: upstream.auth,
            credential: credential.unwrap_or_default(),
            request_field: upstream.request_field.clone(),
            client,
        }
    }

    /// POST {base}/chat — forward one user message, return the raw reply body.
    pub async fn ask(&self, message: &str) -> Result<AgentReply, AgentError> {
        let url = format!("{}/chat", self.base_url);
        let mut body = serde_json::Map::new();
        body.insert("agent_id".to_string(), Value::String(self.agent_id.clone()));
        body.insert(
            self.request_field.clone(),
            Value::String(message.to_string()),
        );
        let req = self.client.post(&url).json(&Value::Object(body));
        let req = match self.auth {
            UpstreamAuthMode::ApiKey => req.header("x-api-key", &self.credential),
            UpstreamAuthMode::Bearer => req.bearer_auth(&self.credential),
        };
        let res = req.send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AgentError::Api { status, body });
        }
        let body: Value = res.json().await?;
        Ok(AgentReply { body })
    }
}
