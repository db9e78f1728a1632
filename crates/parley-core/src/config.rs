use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ParleyError, Result};

/// Top-level configuration for Parley.
///
/// Loaded from `~/.parley/config.toml` by default. Every section falls
/// back to its defaults when missing from the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub latency: LatencyConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl ParleyConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ParleyConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ParleyError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory holding the conversation database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Display name used for messages typed by the user.
    pub author: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.parley/data".to_string(),
            log_level: "info".to_string(),
            author: "You".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
            allowed_origins: vec![
                "http://localhost:5500".to_string(),
                "http://127.0.0.1:5500".to_string(),
            ],
        }
    }
}

/// Remote relay client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// When false, every reply comes from the local rule-based responder.
    pub enabled: bool,
    /// Relay endpoint accepting `{messages: [...]}`.
    pub url: String,
    /// Upper bound on a single relay request.
    pub timeout_secs: u64,
    /// Number of trailing messages sent as context.
    pub history_window: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "http://127.0.0.1:8787/api/chat".to_string(),
            timeout_secs: 30,
            history_window: 20,
        }
    }
}

/// How the relay endpoint produces its replies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamMode {
    /// Echo the last message back. Needs no credentials.
    #[default]
    Echo,
    /// Forward a prompt to a hosted text-generation model.
    Inference,
}

/// Settings for the model behind the relay endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub mode: UpstreamMode,
    /// Base URL; the model id is appended as a path segment.
    pub endpoint: String,
    pub model_id: String,
    /// Name of the environment variable holding the bearer token.
    pub api_key_env: String,
    /// System line used when the conversation carries no system turn.
    pub system_prompt: String,
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            mode: UpstreamMode::Echo,
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            model_id: "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
            api_key_env: "HUGGINGFACE_API_KEY".to_string(),
            system_prompt: "You are a helpful assistant.".to_string(),
            max_new_tokens: 256,
            temperature: 0.7,
            top_p: 0.95,
            timeout_secs: 60,
        }
    }
}

/// Artificial "typing" delay inserted before a reply is resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub enabled: bool,
    pub base_ms: u64,
    /// Added per character of the utterance, capped at `max_scaled_ms`.
    pub per_char_ms: u64,
    pub max_scaled_ms: u64,
    /// Upper bound (exclusive) of the uniform random jitter.
    pub jitter_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_ms: 300,
            per_char_ms: 12,
            max_scaled_ms: 1200,
            jitter_ms: 400,
        }
    }
}

/// Conversation behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum utterance length in characters.
    pub max_message_length: usize,
    /// Most recent matches listed by a history search.
    pub search_limit: usize,
    /// Author name on assistant replies.
    pub assistant_name: String,
    /// Append a welcome message when a conversation starts empty.
    pub seed_welcome: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_length: 2000,
            search_limit: 5,
            assistant_name: "AI".to_string(),
            seed_welcome: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = ParleyConfig::default();
        assert_eq!(config.general.data_dir, "~/.parley/data");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.author, "You");
        assert_eq!(config.server.port, 8787);
        assert!(config.relay.enabled);
        assert_eq!(config.relay.history_window, 20);
        assert_eq!(config.upstream.mode, UpstreamMode::Echo);
        assert_eq!(config.upstream.max_new_tokens, 256);
        assert!(!config.latency.enabled);
        assert_eq!(config.latency.base_ms, 300);
        assert_eq!(config.chat.search_limit, 5);
        assert_eq!(config.chat.assistant_name, "AI");
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
data_dir = "/custom/data"
log_level = "debug"
author = "Robin"

[server]
port = 9000
allowed_origins = ["https://chat.example.com"]

[relay]
enabled = false
url = "http://relay.internal/api/chat"
timeout_secs = 5
history_window = 10

[upstream]
mode = "inference"
model_id = "bigscience/bloom-560m"
temperature = 0.2

[latency]
enabled = true
jitter_ms = 0
"#;
        let file = create_temp_config(content);
        let config = ParleyConfig::load(file.path()).unwrap();
        assert_eq!(config.general.data_dir, "/custom/data");
        assert_eq!(config.general.author, "Robin");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.allowed_origins, vec!["https://chat.example.com"]);
        assert!(!config.relay.enabled);
        assert_eq!(config.relay.url, "http://relay.internal/api/chat");
        assert_eq!(config.relay.timeout_secs, 5);
        assert_eq!(config.relay.history_window, 10);
        assert_eq!(config.upstream.mode, UpstreamMode::Inference);
        assert_eq!(config.upstream.model_id, "bigscience/bloom-560m");
        assert!((config.upstream.temperature - 0.2).abs() < f64::EPSILON);
        assert!(config.latency.enabled);
        assert_eq!(config.latency.jitter_ms, 0);
        // Untouched fields keep their defaults.
        assert_eq!(config.latency.base_ms, 300);
        assert_eq!(config.upstream.api_key_env, "HUGGINGFACE_API_KEY");
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let file = create_temp_config("[general]\nlog_level = \"warn\"\n");
        let config = ParleyConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.data_dir, "~/.parley/data");
        assert_eq!(config.relay.timeout_secs, 30);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = ParleyConfig::load(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.chat.seed_welcome);
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("[relay\nenabled = ");
        let err = ParleyConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ParleyError::Config(_)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = ParleyConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.data_dir, "~/.parley/data");
    }

    #[test]
    fn test_save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ParleyConfig::default();
        config.upstream.mode = UpstreamMode::Inference;
        config.chat.search_limit = 3;
        config.save(&path).unwrap();

        let reloaded = ParleyConfig::load(&path).unwrap();
        assert_eq!(reloaded.upstream.mode, UpstreamMode::Inference);
        assert_eq!(reloaded.chat.search_limit, 3);
        assert_eq!(reloaded.relay.url, config.relay.url);
    }
}
