//! Route handler functions for all API endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use parley_core::types::{HistoryTurn, Role};

use crate::error::ApiError;
use crate::render::RenderedMessage;
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RelayResponse {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<RenderedMessage>,
}

/// Request body for POST /messages.
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    /// Defaults to the configured author.
    pub author: Option<String>,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExchangeResponse {
    pub user: RenderedMessage,
    pub reply: RenderedMessage,
    /// `relay`, `loading` or `fallback`.
    pub source: String,
}

// =============================================================================
// Health
// =============================================================================

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

// =============================================================================
// Relay endpoint
// =============================================================================

/// Read `{messages: [{role, content}, ...]}`. A missing `messages` field
/// is an empty conversation; entries that are not objects are skipped.
pub fn parse_relay_messages(body: &Value) -> Result<Vec<HistoryTurn>, ApiError> {
    let object = body
        .as_object()
        .ok_or_else(|| ApiError::BadRequest("body must be a JSON object".to_string()))?;

    let messages = match object.get("messages") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ApiError::BadRequest("'messages' must be a list".to_string())),
    };

    Ok(messages
        .iter()
        .filter_map(|m| m.as_object())
        .map(|m| {
            let role = m
                .get("role")
                .and_then(|r| r.as_str())
                .map(Role::from_name)
                .unwrap_or_default();
            let content = m.get("content").and_then(|c| c.as_str()).unwrap_or("");
            HistoryTurn::new(role, content)
        })
        .collect())
}

/// POST /api/chat - reply to a conversation with the configured model.
pub async fn relay_chat(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RelayResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let turns = parse_relay_messages(&body)?;

    tracing::debug!(turns = turns.len(), mode = ?state.upstream.mode(), "Relay request");

    let reply = state.upstream.reply(&turns).await?;
    Ok(Json(RelayResponse { reply }))
}

// =============================================================================
// Conversation endpoints
// =============================================================================

/// GET /messages - the whole conversation, oldest first.
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let messages = state.store.all()?;
    Ok(Json(MessagesResponse {
        messages: messages.iter().map(RenderedMessage::from).collect(),
    }))
}

/// POST /messages - submit an utterance and get the reply.
pub async fn post_message(
    State(state): State<AppState>,
    body: Result<Json<PostMessageRequest>, JsonRejection>,
) -> Result<Json<ExchangeResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let author = body
        .author
        .unwrap_or_else(|| state.config.general.author.clone());

    let exchange = state
        .pipeline
        .respond(state.store.as_ref(), &author, &body.text)
        .await?;

    Ok(Json(ExchangeResponse {
        user: RenderedMessage::from(&exchange.user),
        reply: RenderedMessage::from(&exchange.reply),
        source: exchange.source.name().to_string(),
    }))
}

/// DELETE /messages - clear the conversation.
pub async fn clear_messages(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.store.clear()?;
    tracing::info!("Conversation cleared via API");
    Ok(StatusCode::NO_CONTENT)
}
