//! Integration tests: relay behavior against a mocked upstream agent API.
//! Covers envelope normalization, reply-field priority, status passthrough
//! without leaking upstream bodies, and input validation with no upstream call.

use lib::config::Config;
use lib::relay;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

/// Start a relay pointed at `upstream_url`; wait for the health endpoint.
/// Returns the relay base URL and a client for it.
async fn start_relay(upstream_url: &str) -> (String, reqwest::Client) {
    let port = free_port();
    let mut config = Config::default();
    config.relay.port = port;
    config.upstream.base_url = upstream_url.to_string();
    config.upstream.agent_id = "agent-123".to_string();
    config.upstream.credential = Some("test-key".to_string());

    tokio::spawn(async move {
        let _ = relay::run_relay(config).await;
    });

    let base = format!("http://127.0.0.1:{}", port);
    let client = reqwest::Client::new();
    for _ in 0..100 {
        if let Ok(resp) = client.get(format!("{}/", base)).send().await {
            if resp.status().is_success() {
                return (base, client);
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("relay did not become healthy at {}", base);
}

#[tokio::test]
async fn chat_forwards_one_upstream_call_and_normalizes_reply() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("x-api-key", "test-key"))
        .and(body_partial_json(json!({
            "agent_id": "agent-123",
            "message": "What is Suraj's experience?"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Suraj has 5 years of experience."
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let (base, client) = start_relay(&upstream.uri()).await;
    let resp = client
        .post(format!("{}/api/chat", base))
        .json(&json!({ "message": "What is Suraj's experience?" }))
        .send()
        .await
        .expect("send");
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = resp.json().await.expect("json");
    assert_eq!(
        body.get("message").and_then(|v| v.as_str()),
        Some("Suraj has 5 years of experience.")
    );
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn chat_probes_reply_fields_in_priority_order() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": "third choice",
            "message": "second choice",
            "response": "first choice"
        })))
        .mount(&upstream)
        .await;

    let (base, client) = start_relay(&upstream.uri()).await;
    let body: serde_json::Value = client
        .post(format!("{}/api/chat", base))
        .json(&json!({ "message": "hi" }))
        .send()
        .await
        .expect("send")
        .json()
        .await
        .expect("json");
    assert_eq!(body.get("message").and_then(|v| v.as_str()), Some("first choice"));
}

#[tokio::test]
async fn chat_returns_empty_envelope_when_no_reply_field_matches() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&upstream)
        .await;

    let (base, client) = start_relay(&upstream.uri()).await;
    let resp = client
        .post(format!("{}/api/chat", base))
        .json(&json!({ "message": "hi" }))
        .send()
        .await
        .expect("send");
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = resp.json().await.expect("json");
    assert!(body.get("message").is_none());
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn upstream_error_status_passes_through_without_its_body() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(502).set_body_string("upstream secret diagnostic detail"),
        )
        .mount(&upstream)
        .await;

    let (base, client) = start_relay(&upstream.uri()).await;
    let resp = client
        .post(format!("{}/api/chat", base))
        .json(&json!({ "message": "hi" }))
        .send()
        .await
        .expect("send");
    assert_eq!(resp.status().as_u16(), 502);
    let text = resp.text().await.expect("text");
    assert!(!text.contains("secret"));
    let body: serde_json::Value = serde_json::from_str(&text).expect("json");
    assert_eq!(
        body.get("error").and_then(|v| v.as_str()),
        Some("failed to get response from agent")
    );
}

#[tokio::test]
async fn invalid_message_is_rejected_without_an_upstream_call() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "nope" })))
        .expect(0)
        .mount(&upstream)
        .await;

    let (base, client) = start_relay(&upstream.uri()).await;
    let url = format!("{}/api/chat", base);

    for payload in [json!({}), json!({ "message": 42 }), json!({ "message": "" })] {
        let resp = client.post(&url).json(&payload).send().await.expect("send");
        assert_eq!(resp.status().as_u16(), 400, "payload: {}", payload);
        let body: serde_json::Value = resp.json().await.expect("json");
        assert_eq!(body.get("error").and_then(|v| v.as_str()), Some("invalid message"));
    }

    let resp = client
        .post(&url)
        .body("not json")
        .header("content-type", "application/json")
        .send()
        .await
        .expect("send");
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn unreachable_upstream_is_an_internal_error() {
    // A bound-then-dropped port: nothing is listening there.
    let dead_port = free_port();
    let (base, client) = start_relay(&format!("http://127.0.0.1:{}", dead_port)).await;

    let resp = client
        .post(format!("{}/api/chat", base))
        .json(&json!({ "message": "hi" }))
        .send()
        .await
        .expect("send");
    assert_eq!(resp.status().as_u16(), 500);
    let body: serde_json::Value = resp.json().await.expect("json");
    assert_eq!(
        body.get("error").and_then(|v| v.as_str()),
        Some("internal server error")
    );
}
