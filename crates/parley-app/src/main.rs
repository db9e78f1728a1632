//! Parley application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration
//! 2. Initialize tracing
//! 3. Open the SQLite conversation store
//! 4. Build the response pipeline (relay client + local responder)
//! 5. Run the requested command: HTTP server, terminal chat, or clear

mod cli;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use parley_api::{AppState, UpstreamClient};
use parley_chat::ResponsePipeline;
use parley_core::config::ParleyConfig;
use parley_core::log::ConversationStore;
use parley_storage::{Database, MessageRepository};

use cli::{CliArgs, Command};

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing so the configured level can apply.
    let config_file = args.resolve_config_path();
    let loaded = if config_file.exists() {
        Some(ParleyConfig::load(&config_file))
    } else {
        None
    };
    let base = match &loaded {
        Some(Ok(config)) => config.clone(),
        _ => ParleyConfig::default(),
    };
    let config = args.apply(base);

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Parley v{}", env!("CARGO_PKG_VERSION"));
    match loaded {
        Some(Ok(_)) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(Err(e)) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
        None => tracing::info!(path = %config_file.display(), "No config file, using defaults"),
    }

    // Storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }

    let db_path = data_dir.join("parley.db");
    let db = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite database opened");
    let store = Arc::new(MessageRepository::new(db));

    match args.command() {
        Command::Clear => {
            store.clear()?;
            println!("Conversation cleared.");
        }
        Command::Chat => {
            let pipeline = ResponsePipeline::from_config(&config)?;
            tracing::info!(
                relay = pipeline.relay_enabled(),
                url = %config.relay.url,
                "Response pipeline ready"
            );
            repl::run(&pipeline, &*store, &config.general.author).await?;
        }
        Command::Serve => {
            let pipeline = ResponsePipeline::from_config(&config)?;
            pipeline.start_session(&*store)?;
            let upstream = UpstreamClient::from_env(config.upstream.clone())?;
            tracing::info!(mode = ?upstream.mode(), "Relay endpoint ready");

            let store: Arc<dyn ConversationStore> = store;
            let state = AppState::new(config, store, pipeline, upstream);
            parley_api::start_server(state).await?;
        }
    }

    Ok(())
}
