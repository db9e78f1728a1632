//! SQLite-backed conversation store.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use parley_core::error::ParleyError;
use parley_core::log::ConversationStore;
use parley_core::types::{Message, Role};

use crate::db::Database;

const SELECT_COLUMNS: &str = "SELECT id, author, role, text, timestamp FROM messages";

/// Repository for conversation messages, ordered by insertion.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    db: Arc<Database>,
}

impl MessageRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn query_messages(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Message>, ParleyError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(sql)
                .map_err(|e| ParleyError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(params, |row| Ok(row_to_message(row)))
                .map_err(|e| ParleyError::Storage(e.to_string()))?;

            let mut messages = Vec::new();
            for row in rows {
                let message = row.map_err(|e| ParleyError::Storage(e.to_string()))??;
                messages.push(message);
            }
            Ok(messages)
        })
    }
}

impl ConversationStore for MessageRepository {
    fn append(&self, message: Message) -> Result<(), ParleyError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, author, role, text, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    message.id.to_string(),
                    message.author,
                    message.role.as_str(),
                    message.text,
                    message.timestamp.timestamp_millis(),
                ],
            )
            .map_err(|e| ParleyError::Storage(format!("Failed to append message: {}", e)))?;
            Ok(())
        })
    }

    fn all(&self) -> Result<Vec<Message>, ParleyError> {
        self.query_messages(&format!("{} ORDER BY seq ASC", SELECT_COLUMNS), [])
    }

    fn tail(&self, n: usize) -> Result<Vec<Message>, ParleyError> {
        let sql = format!(
            "{} WHERE seq IN (SELECT seq FROM messages ORDER BY seq DESC LIMIT ?1)
             ORDER BY seq ASC",
            SELECT_COLUMNS
        );
        self.query_messages(&sql, rusqlite::params![n as i64])
    }

    fn clear(&self) -> Result<(), ParleyError> {
        self.db.with_conn(|conn| {
            let removed = conn
                .execute("DELETE FROM messages", [])
                .map_err(|e| ParleyError::Storage(format!("Failed to clear messages: {}", e)))?;
            tracing::info!(removed, "Conversation cleared");
            Ok(())
        })
    }

    fn len(&self) -> Result<usize, ParleyError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
                .map_err(|e| ParleyError::Storage(e.to_string()))?;
            Ok(count as usize)
        })
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<Message, ParleyError> {
    let id: String = row.get(0).map_err(|e| ParleyError::Storage(e.to_string()))?;
    let author: String = row.get(1).map_err(|e| ParleyError::Storage(e.to_string()))?;
    let role: String = row.get(2).map_err(|e| ParleyError::Storage(e.to_string()))?;
    let text: String = row.get(3).map_err(|e| ParleyError::Storage(e.to_string()))?;
    let millis: i64 = row.get(4).map_err(|e| ParleyError::Storage(e.to_string()))?;

    let id = Uuid::parse_str(&id)
        .map_err(|e| ParleyError::Storage(format!("Invalid message id '{}': {}", id, e)))?;
    let timestamp = Utc
        .timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| ParleyError::Storage(format!("Invalid timestamp: {}", millis)))?;

    Ok(Message {
        id,
        author,
        role: Role::from_name(&role),
        text,
        timestamp,
    })
}
