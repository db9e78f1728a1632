//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use parley_chat::ResponsePipeline;
use parley_core::config::ParleyConfig;
use parley_core::log::ConversationStore;

use crate::upstream::UpstreamClient;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<ParleyConfig>,
    /// The conversation served by `/messages`.
    pub store: Arc<dyn ConversationStore>,
    /// Resolves replies for `POST /messages`.
    pub pipeline: Arc<ResponsePipeline>,
    /// Model behind `POST /api/chat`.
    pub upstream: Arc<UpstreamClient>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: ParleyConfig,
        store: Arc<dyn ConversationStore>,
        pipeline: ResponsePipeline,
        upstream: UpstreamClient,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            pipeline: Arc::new(pipeline),
            upstream: Arc::new(upstream),
            start_time: Instant::now(),
        }
    }
}
