//! HTTP relay client against a throwaway local server.

use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use parley_chat::prompt::DEFAULT_SYSTEM_PROMPT;
use parley_chat::{build_prompt, HttpRelayClient, RelayError, RelayReply, RemoteReplyClient};
use parley_core::types::{HistoryTurn, Role};

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/api/chat", addr)
}

fn client(url: &str) -> HttpRelayClient {
    HttpRelayClient::new(url, Duration::from_secs(5), DEFAULT_SYSTEM_PROMPT).unwrap()
}

fn window() -> Vec<HistoryTurn> {
    vec![
        HistoryTurn::new(Role::User, "hi"),
        HistoryTurn::new(Role::Assistant, "hello"),
        HistoryTurn::new(Role::User, "how are you?"),
    ]
}

#[tokio::test]
async fn test_relay_sends_messages_and_reads_reply() {
    let router = Router::new().route(
        "/api/chat",
        post(|Json(body): Json<Value>| async move {
            let messages = body["messages"].as_array().cloned().unwrap_or_default();
            let last = messages
                .last()
                .and_then(|m| m["content"].as_str())
                .unwrap_or("")
                .to_string();
            let roles: Vec<String> = messages
                .iter()
                .filter_map(|m| m["role"].as_str().map(|s| s.to_string()))
                .collect();
            Json(json!({ "reply": format!("{} ({})", last, roles.join(",")) }))
        }),
    );
    let url = spawn(router).await;

    let reply = client(&url).resolve(&window()).await.unwrap();
    assert_eq!(
        reply,
        RelayReply::Text("how are you? (user,assistant,user)".to_string())
    );
}

#[tokio::test]
async fn test_relay_503_means_loading() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "model_loading" })),
            )
        }),
    );
    let url = spawn(router).await;

    let reply = client(&url).resolve(&window()).await.unwrap();
    assert_eq!(reply, RelayReply::Loading);
}

#[tokio::test]
async fn test_relay_server_error_is_status_failure() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "missing_token" })),
            )
        }),
    );
    let url = spawn(router).await;

    let err = client(&url).resolve(&window()).await.unwrap_err();
    match err {
        RelayError::Status { status, detail } => {
            assert_eq!(status, 500);
            assert_eq!(detail.as_deref(), Some("missing_token"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_relay_non_json_body() {
    let router = Router::new().route("/api/chat", post(|| async { "<html>nope</html>" }));
    let url = spawn(router).await;

    let err = client(&url).resolve(&window()).await.unwrap_err();
    assert!(matches!(err, RelayError::InvalidBody(_)));
}

#[tokio::test]
async fn test_relay_missing_reply_field() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async { Json(json!({ "generated_text": "hi" })) }),
    );
    let url = spawn(router).await;

    let err = client(&url).resolve(&window()).await.unwrap_err();
    assert!(matches!(err, RelayError::MissingReply));
}

#[tokio::test]
async fn test_relay_prompt_echo_is_stripped() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async {
            let prompt = build_prompt(&window(), DEFAULT_SYSTEM_PROMPT);
            Json(json!({ "reply": format!("{} Doing fine.", prompt) }))
        }),
    );
    let url = spawn(router).await;

    let reply = client(&url).resolve(&window()).await.unwrap();
    assert_eq!(reply, RelayReply::Text("Doing fine.".to_string()));
}

#[tokio::test]
async fn test_relay_connection_refused_is_transport_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}/api/chat", addr))
        .resolve(&window())
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Transport(_)));
}

#[tokio::test]
async fn test_relay_timeout() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({ "reply": "too late" }))
        }),
    );
    let url = spawn(router).await;

    let slow = HttpRelayClient::new(&url, Duration::from_millis(200), DEFAULT_SYSTEM_PROMPT).unwrap();
    let err = slow.resolve(&window()).await.unwrap_err();
    assert!(matches!(err, RelayError::Timeout));
}
