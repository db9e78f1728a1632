//! The model behind `POST /api/chat`.
//!
//! In `echo` mode the relay answers by repeating the last message, which
//! needs no credentials. In `inference` mode it renders the conversation
//! into a plain-text prompt and forwards it to a hosted text-generation
//! endpoint.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use parley_chat::prompt::{build_prompt, strip_prompt_echo};
use parley_core::config::{UpstreamConfig, UpstreamMode};
use parley_core::types::HistoryTurn;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("no API key found in ${0}")]
    MissingToken(String),
    #[error("model is loading, try again shortly")]
    Loading,
    #[error("model endpoint returned status {status}")]
    Status { status: u16, detail: Option<String> },
    #[error("model endpoint unreachable: {0}")]
    Transport(String),
    #[error("model response has no generated text")]
    NoOutput,
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Transport(err.to_string())
    }
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f64,
    top_p: f64,
}

/// Produces replies for the relay endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    config: UpstreamConfig,
    api_key: Option<String>,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig, api_key: Option<String>) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Read the API key from the environment variable named in `config`.
    pub fn from_env(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let api_key = std::env::var(&config.api_key_env).ok();
        Self::new(config, api_key)
    }

    pub fn mode(&self) -> UpstreamMode {
        self.config.mode
    }

    /// Reply to a conversation.
    pub async fn reply(&self, turns: &[HistoryTurn]) -> Result<String, UpstreamError> {
        match self.config.mode {
            UpstreamMode::Echo => Ok(echo_reply(turns)),
            UpstreamMode::Inference => self.infer(turns).await,
        }
    }

    async fn infer(&self, turns: &[HistoryTurn]) -> Result<String, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| UpstreamError::MissingToken(self.config.api_key_env.clone()))?;

        let prompt = build_prompt(turns, &self.config.system_prompt);
        let url = format!(
            "{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&InferenceRequest {
                inputs: &prompt,
                parameters: InferenceParameters {
                    max_new_tokens: self.config.max_new_tokens,
                    temperature: self.config.temperature,
                    top_p: self.config.top_p,
                },
            })
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 503 {
            tracing::info!(model = %self.config.model_id, "Model is loading");
            return Err(UpstreamError::Loading);
        }
        if !status.is_success() {
            let detail = response.text().await.ok().filter(|t| !t.is_empty());
            tracing::warn!(status = status.as_u16(), "Model endpoint error");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let body: Value = response.json().await.map_err(|_| UpstreamError::NoOutput)?;
        let generated = extract_generated_text(&body).ok_or(UpstreamError::NoOutput)?;
        Ok(strip_prompt_echo(&generated, &prompt))
    }
}

/// `Echo: <last content>`, or `Echo: hello` for an empty conversation.
pub fn echo_reply(turns: &[HistoryTurn]) -> String {
    let last = turns
        .last()
        .map(|t| t.content.trim())
        .filter(|c| !c.is_empty())
        .unwrap_or("hello");
    format!("Echo: {}", last)
}

/// Generated text from either `[{"generated_text": ...}]` or
/// `{"generated_text": ...}`.
pub fn extract_generated_text(body: &Value) -> Option<String> {
    body.get(0)
        .and_then(|first| first.get("generated_text"))
        .or_else(|| body.get("generated_text"))
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}
