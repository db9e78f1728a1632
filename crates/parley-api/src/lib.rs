//! Parley API crate - axum HTTP server and route handlers.
//!
//! Serves the inference relay (`POST /api/chat`), the conversation
//! endpoints under `/messages`, and a health check.

pub mod error;
pub mod handlers;
pub mod render;
pub mod routes;
pub mod state;
pub mod upstream;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
pub use upstream::UpstreamClient;
