pub mod config;
pub mod error;
pub mod log;
pub mod types;

pub use config::ParleyConfig;
pub use error::{ParleyError, Result};
pub use log::{ConversationLog, ConversationStore};
pub use types::*;
