//! Relay HTTP server: same-origin front door for the hosted agent API.
//!
//! Holds no per-request state; every invocation is independent and safe to run
//! concurrently. The credential never reaches the caller, and neither do raw
//! upstream error bodies — those go to the server log only.

use crate::config::{self, Config};
use crate::relay::protocol::ChatEnvelope;
use crate::reply;
use crate::upstream::{AgentClient, AgentError};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Caller-facing error strings. Upstream detail never crosses this boundary.
const ERR_INVALID_MESSAGE: &str = "invalid message";
const ERR_UPSTREAM: &str = "failed to get response from agent";
const ERR_INTERNAL: &str = "internal server error";

/// Shared state for the relay (immutable config + upstream client).
#[derive(Clone)]
pub struct RelayState {
    pub config: Arc<Config>,
    pub agent: AgentClient,
}

/// Routes: health probe and the chat proxy.
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/api/chat", post(chat_http))
        .with_state(state)
}

/// Run the relay until SIGINT/SIGTERM.
pub async fn run_relay(config: Config) -> Result<()> {
    let credential = config::resolve_agent_credential(&config);
    if credential.is_none() {
        log::warn!("no upstream credential configured (set PARLEY_AGENT_KEY or upstream.credential)");
    }
    let agent = AgentClient::new(&config.upstream, credential);
    let bind_addr = format!("{}:{}", config.relay.bind, config.relay.port);
    let state = RelayState {
        config: Arc::new(config),
        agent,
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("relay listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("relay server exited")?;
    log::info!("relay stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<RelayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.relay.port,
    }))
}

/// POST /api/chat — validate `{ "message": string }`, forward exactly one
/// upstream call, normalize the result. Upstream failures keep their status
/// code but the caller only ever sees a generic error string.
async fn chat_http(
    State(state): State<RelayState>,
    body: Bytes,
) -> (StatusCode, Json<ChatEnvelope>) {
    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ChatEnvelope::err(ERR_INVALID_MESSAGE)),
            )
        }
    };
    let message = match payload.get("message").and_then(|v| v.as_str()) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ChatEnvelope::err(ERR_INVALID_MESSAGE)),
            )
        }
    };

    log::info!("relay: forwarding chat message ({} chars)", message.len());
    match state.agent.ask(&message).await {
        Ok(reply) => {
            let envelope =
                match reply::first_reply_field(&reply.body, &state.config.upstream.reply_fields) {
                    Some(text) => ChatEnvelope::reply(text),
                    None => {
                        log::warn!("relay: upstream reply had no recognizable reply field");
                        ChatEnvelope::empty()
                    }
                };
            (StatusCode::OK, Json(envelope))
        }
        Err(AgentError::Api { status, body }) => {
            log::warn!("relay: upstream returned {}: {}", status, body);
            let code = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            (code, Json(ChatEnvelope::err(ERR_UPSTREAM)))
        }
        Err(e) => {
            log::error!("relay: upstream call failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatEnvelope::err(ERR_INTERNAL)),
            )
        }
    }
}
