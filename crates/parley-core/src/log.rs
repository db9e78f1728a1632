//! Conversation log: the ordered, append-only sequence of messages.
//!
//! `ConversationStore` is the narrow interface the response pipeline
//! talks to. `ConversationLog` is the in-memory implementation; the
//! storage crate provides a SQLite-backed one.

use std::sync::Mutex;

use crate::error::{ParleyError, Result};
use crate::types::Message;

/// Ordered message storage consumed by the response pipeline.
///
/// Implementations must preserve insertion order in `all` and `tail`.
pub trait ConversationStore: Send + Sync {
    /// Append a message to the end of the log.
    fn append(&self, message: Message) -> Result<()>;

    /// Every message, oldest first.
    fn all(&self) -> Result<Vec<Message>>;

    /// The last `n` messages, oldest first.
    fn tail(&self, n: usize) -> Result<Vec<Message>>;

    /// Remove every message.
    fn clear(&self) -> Result<()>;

    /// Number of stored messages.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// In-memory conversation log, created at session start and dropped at
/// session end.
#[derive(Debug, Default)]
pub struct ConversationLog {
    messages: Mutex<Vec<Message>>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log pre-populated with `messages` in the given order.
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages: Mutex::new(messages),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Message>>> {
        self.messages
            .lock()
            .map_err(|e| ParleyError::Storage(format!("conversation lock poisoned: {}", e)))
    }
}

impl ConversationStore for ConversationLog {
    fn append(&self, message: Message) -> Result<()> {
        self.lock()?.push(message);
        Ok(())
    }

    fn all(&self) -> Result<Vec<Message>> {
        Ok(self.lock()?.clone())
    }

    fn tail(&self, n: usize) -> Result<Vec<Message>> {
        let messages = self.lock()?;
        let start = messages.len().saturating_sub(n);
        Ok(messages[start..].to_vec())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}
