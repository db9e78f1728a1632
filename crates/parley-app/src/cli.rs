//! CLI argument definitions for the Parley application.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use parley_core::config::ParleyConfig;

/// Parley - a chat responder that asks a remote model first and answers
/// locally when it can't.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Directory holding the conversation database.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Relay endpoint consulted before the local responder.
    #[arg(long = "relay-url")]
    pub relay_url: Option<String>,

    /// Answer every message locally.
    #[arg(long = "offline")]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Chat in the terminal.
    Chat,
    /// Delete the stored conversation.
    Clear,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > PARLEY_CONFIG env var > ~/.parley/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("PARLEY_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the API server port.
    ///
    /// Priority: --port flag > PARLEY_PORT env var > config file value.
    pub fn resolve_port(&self, config_port: u16) -> u16 {
        if let Some(p) = self.port {
            return p;
        }
        if let Ok(val) = std::env::var("PARLEY_PORT") {
            if let Ok(p) = val.parse::<u16>() {
                return p;
            }
        }
        config_port
    }

    /// Resolve the relay URL.
    ///
    /// Priority: --relay-url flag > PARLEY_RELAY_URL env var > config file value.
    pub fn resolve_relay_url(&self, config_url: &str) -> String {
        if let Some(ref url) = self.relay_url {
            return url.clone();
        }
        match std::env::var("PARLEY_RELAY_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => config_url.to_string(),
        }
    }

    /// Resolve the data directory path. `None` keeps the config value.
    pub fn resolve_data_dir(&self) -> Option<String> {
        self.data_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// Resolve the log level. `None` keeps the config value.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }

    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }

    /// Fold every override into `config`.
    pub fn apply(&self, mut config: ParleyConfig) -> ParleyConfig {
        config.server.port = self.resolve_port(config.server.port);
        config.relay.url = self.resolve_relay_url(&config.relay.url);
        if let Some(dir) = self.resolve_data_dir() {
            config.general.data_dir = dir;
        }
        if let Some(level) = self.resolve_log_level() {
            config.general.log_level = level;
        }
        if self.offline {
            config.relay.enabled = false;
        }
        config
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".parley").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".parley").join("config.toml");
    }
    PathBuf::from("config.toml")
}
