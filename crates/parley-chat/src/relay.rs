//! Client side of the inference relay.
//!
//! The relay accepts `{"messages": [{role, content}, ...]}` and answers
//! `{"reply": "..."}`. HTTP 503 means the model behind it is still
//! loading; any other failure is reported as a [`RelayError`] so the
//! caller can fall back to the local responder.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use parley_core::config::{RelayConfig, UpstreamConfig};
use parley_core::types::HistoryTurn;

use crate::error::RelayError;
use crate::prompt::{build_prompt, strip_prompt_echo};

/// A usable relay outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayReply {
    /// Cleaned, non-empty reply text.
    Text(String),
    /// The model is warming up; the caller should say so instead of falling back.
    Loading,
}

/// Something that can turn a conversation window into a reply.
#[async_trait]
pub trait RemoteReplyClient: Send + Sync {
    /// Request a reply for `window`, whose last turn is the current utterance.
    async fn resolve(&self, window: &[HistoryTurn]) -> Result<RelayReply, RelayError>;
}

// =============================================================================
// OfflineRelay
// =============================================================================

/// Relay stand-in used when the remote path is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRelay;

#[async_trait]
impl RemoteReplyClient for OfflineRelay {
    async fn resolve(&self, _window: &[HistoryTurn]) -> Result<RelayReply, RelayError> {
        Err(RelayError::Disabled)
    }
}

// =============================================================================
// HttpRelayClient
// =============================================================================

#[derive(Serialize)]
struct RelayRequest<'a> {
    messages: &'a [HistoryTurn],
}

/// HTTP client for a relay endpoint.
#[derive(Debug, Clone)]
pub struct HttpRelayClient {
    client: reqwest::Client,
    url: String,
    system_prompt: String,
}

impl HttpRelayClient {
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        system_prompt: impl Into<String>,
    ) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            system_prompt: system_prompt.into(),
        })
    }

    pub fn from_config(relay: &RelayConfig, upstream: &UpstreamConfig) -> Result<Self, RelayError> {
        Self::new(
            relay.url.clone(),
            Duration::from_secs(relay.timeout_secs),
            upstream.system_prompt.clone(),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RemoteReplyClient for HttpRelayClient {
    async fn resolve(&self, window: &[HistoryTurn]) -> Result<RelayReply, RelayError> {
        let response = self
            .client
            .post(&self.url)
            .json(&RelayRequest { messages: window })
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        let prompt = build_prompt(window, &self.system_prompt);
        interpret_response(status, &body, &prompt)
    }
}

/// Classify a relay response.
///
/// `prompt` is the transcript the relay would have rendered for this
/// window; a reply that starts by repeating it has the copy removed.
pub fn interpret_response(status: u16, body: &str, prompt: &str) -> Result<RelayReply, RelayError> {
    if status == 503 {
        return Ok(RelayReply::Loading);
    }

    let parsed: Result<Value, _> = serde_json::from_str(body);

    if !(200..300).contains(&status) {
        let detail = parsed.ok().and_then(|v| {
            v.get("error")
                .and_then(|e| e.as_str())
                .map(|s| s.to_string())
        });
        return Err(RelayError::Status { status, detail });
    }

    let value = parsed.map_err(|e| RelayError::InvalidBody(e.to_string()))?;
    let reply = value
        .get("reply")
        .and_then(|r| r.as_str())
        .ok_or(RelayError::MissingReply)?;

    let cleaned = strip_prompt_echo(reply.trim(), prompt);
    if cleaned.is_empty() {
        return Err(RelayError::EmptyReply);
    }
    Ok(RelayReply::Text(cleaned))
}
