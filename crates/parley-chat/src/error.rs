//! Error types for response resolution.

use parley_core::error::ParleyError;

/// Errors from the send operation.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<ParleyError> for ChatError {
    fn from(err: ParleyError) -> Self {
        ChatError::Storage(err.to_string())
    }
}

/// Why the relay could not supply a reply. Every variant triggers the
/// local fallback.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("relay is disabled")]
    Disabled,
    #[error("relay transport failed: {0}")]
    Transport(String),
    #[error("relay request timed out")]
    Timeout,
    #[error("relay returned status {status}{}", detail.as_deref().map(|d| format!(" ({})", d)).unwrap_or_default())]
    Status { status: u16, detail: Option<String> },
    #[error("relay body is not valid JSON: {0}")]
    InvalidBody(String),
    #[error("relay body has no string 'reply' field")]
    MissingReply,
    #[error("relay reply is empty")]
    EmptyReply,
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RelayError::Timeout
        } else {
            RelayError::Transport(err.to_string())
        }
    }
}
