//! Schema migrations, applied in order and recorded in `schema_migrations`.

use rusqlite::Connection;
use tracing::info;

use parley_core::error::ParleyError;

/// `(version, name, sql)`. Append only; never edit a shipped entry.
const MIGRATIONS: &[(i64, &str, &str)] = &[(
    1,
    "messages",
    // `seq` carries insertion order; timestamps alone can collide.
    "CREATE TABLE IF NOT EXISTS messages (
        seq         INTEGER PRIMARY KEY AUTOINCREMENT,
        id          TEXT NOT NULL UNIQUE,
        author      TEXT NOT NULL,
        role        TEXT NOT NULL DEFAULT 'user'
                    CHECK (role IN ('user', 'assistant', 'system')),
        text        TEXT NOT NULL CHECK (length(text) > 0),
        timestamp   INTEGER NOT NULL
    );",
)];

fn storage(context: &str, e: rusqlite::Error) -> ParleyError {
    ParleyError::Storage(format!("{}: {}", context, e))
}

/// Highest applied version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> Result<i64, ParleyError> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )
    .map_err(|e| storage("Failed to read schema version", e))
}

/// Latest version this build knows about.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|(v, _, _)| *v).unwrap_or(0)
}

/// Apply every migration newer than the recorded version. Each one runs
/// in its own transaction together with its `schema_migrations` row.
pub fn run_migrations(conn: &Connection) -> Result<(), ParleyError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| storage("Failed to create migrations table", e))?;

    let applied = current_version(conn)?;

    for (version, name, sql) in MIGRATIONS.iter().filter(|(v, _, _)| *v > applied) {
        let batch = format!(
            "BEGIN;\n{}\nINSERT INTO schema_migrations (version, name) VALUES ({}, '{}');\nCOMMIT;",
            sql, version, name
        );
        if let Err(e) = conn.execute_batch(&batch) {
            let _ = conn.execute_batch("ROLLBACK;");
            return Err(storage(&format!("Migration v{} ({}) failed", version, name), e));
        }
        info!(version, name, "Applied migration");
    }

    Ok(())
}
