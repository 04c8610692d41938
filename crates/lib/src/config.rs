//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.parley/config.json`) and environment.
//! Everything provider-specific about the upstream agent API (base URL, auth scheme,
//! field names) lives here rather than in code, so switching providers is a config
//! edit and never a rebuild.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Relay server settings.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Upstream agent API settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Chat client settings (relay URL, suggested prompts).
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Relay bind and port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayConfig {
    /// HTTP port (default 7878).
    #[serde(default = "default_relay_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_relay_bind")]
    pub bind: String,
}

fn default_relay_port() -> u16 {
    7878
}

fn default_relay_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: default_relay_port(),
            bind: default_relay_bind(),
        }
    }
}

/// How the credential is sent to the upstream API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpstreamAuthMode {
    /// Send the credential in an `x-api-key` header.
    #[default]
    ApiKey,

    /// Send the credential as `Authorization: Bearer <credential>`.
    Bearer,
}

/// Upstream agent API: where to send messages and how to authenticate.
/// Immutable after load; the relay reads it once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamConfig {
    /// Base URL of the agent API (the relay POSTs to `{baseUrl}/chat`).
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,

    /// Fixed agent identifier included in every upstream request body.
    #[serde(default)]
    pub agent_id: String,

    /// Credential header scheme: "apiKey" or "bearer".
    #[serde(default)]
    pub auth: UpstreamAuthMode,

    /// Service credential. Overridden by PARLEY_AGENT_KEY env. When absent an
    /// empty credential is sent and the upstream rejects the call.
    pub credential: Option<String>,

    /// Field name the upstream expects the user message under.
    #[serde(default = "default_request_field")]
    pub request_field: String,

    /// Candidate reply fields, probed in order on upstream success bodies.
    #[serde(default = "default_reply_fields")]
    pub reply_fields: Vec<String>,

    /// Outbound request timeout in seconds (default 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_upstream_base_url() -> String {
    "https://api.anthropic.com/agents".to_string()
}

fn default_request_field() -> String {
    "message".to_string()
}

fn default_reply_fields() -> Vec<String> {
    vec![
        "response".to_string(),
        "message".to_string(),
        "data".to_string(),
    ]
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            agent_id: String::new(),
            auth: UpstreamAuthMode::default(),
            credential: None,
            request_field: default_request_field(),
            reply_fields: default_reply_fields(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Chat client settings: which relay to talk to and the prompts offered
/// before the first message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatConfig {
    /// Relay base URL. When unset, derived from the relay bind and port.
    pub relay_url: Option<String>,

    /// Welcome line printed when a chat session starts.
    #[serde(default = "default_welcome")]
    pub welcome: String,

    /// Suggested questions offered while the transcript is empty.
    #[serde(default = "default_suggestions")]
    pub suggestions: Vec<String>,
}

fn default_welcome() -> String {
    "Welcome! Ask me anything about my professional background.".to_string()
}

fn default_suggestions() -> Vec<String> {
    vec![
        "What experience do you have?".to_string(),
        "What technical skills do you have?".to_string(),
        "What is your education background?".to_string(),
        "Tell me about your recent projects".to_string(),
    ]
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            relay_url: None,
            welcome: default_welcome(),
            suggestions: default_suggestions(),
        }
    }
}

/// Resolve the upstream credential: env PARLEY_AGENT_KEY overrides config.
pub fn resolve_agent_credential(config: &Config) -> Option<String> {
    std::env::var("PARLEY_AGENT_KEY")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .upstream
                .credential
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve the relay base URL for the chat client: chat.relayUrl when set,
/// otherwise built from the relay bind and port.
pub fn resolve_relay_url(config: &Config) -> String {
    config
        .chat
        .relay_url
        .as_ref()
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            format!(
                "http://{}:{}",
                config.relay.bind.trim(),
                config.relay.port
            )
        })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("PARLEY_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".parley").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the default path (or PARLEY_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
