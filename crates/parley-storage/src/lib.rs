//! Parley storage crate - SQLite persistence for the conversation log.
//!
//! Provides a WAL-mode SQLite database with migrations and a
//! `ConversationStore` implementation over the `messages` table.

pub mod db;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use repository::MessageRepository;
