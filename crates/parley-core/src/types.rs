use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Who produced a message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The person typing into the conversation (default).
    #[default]
    User,
    /// A reply resolved by the response pipeline.
    Assistant,
    /// Instructions that steer the relay's prompt.
    System,
}

impl Role {
    /// Lowercase wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    /// Parse a stored role name. Unknown names map to `User`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "assistant" => Role::Assistant,
            "system" => Role::System,
            _ => Role::User,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Conversation data
// =============================================================================

/// A single entry in the conversation log.
///
/// Messages are immutable once appended; `text` is trimmed and non-empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    /// Display name of the author.
    pub author: String,
    #[serde(default)]
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with a fresh id and the current time.
    ///
    /// The text is trimmed; callers reject empty text before construction.
    pub fn new(author: impl Into<String>, role: Role, text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: author.into(),
            role,
            text: text.trim().to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Shorthand for a user-authored message.
    pub fn user(author: impl Into<String>, text: &str) -> Self {
        Self::new(author, Role::User, text)
    }

    /// Shorthand for an assistant-authored message.
    pub fn assistant(author: impl Into<String>, text: &str) -> Self {
        Self::new(author, Role::Assistant, text)
    }
}

/// The `{role, content}` shape sent to the inference relay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub content: String,
}

impl HistoryTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&Message> for HistoryTurn {
    /// Assistant messages stay assistant; every other role is sent as user.
    fn from(message: &Message) -> Self {
        let role = match message.role {
            Role::Assistant => Role::Assistant,
            Role::User | Role::System => Role::User,
        };
        Self {
            role,
            content: message.text.clone(),
        }
    }
}
