//! Index schema management.

use crate::error::{IndexError, IndexResult};
use rusqlite::Connection;
use tracing::info;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the index schema.
pub fn initialize_schema(conn: &Connection) -> IndexResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating initial index schema...");
        create_initial_schema(conn)
            .map_err(|e| IndexError::Migration(format!("initial schema: {}", e)))?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> IndexResult<i32> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> IndexResult<()> {
    conn.pragma_update(None, "user_version", version)?;
    Ok(())
}

fn create_initial_schema(conn: &Connection) -> IndexResult<()> {
    conn.execute_batch(
        r#"
        -- Durable source listing
        CREATE TABLE IF NOT EXISTS sources (
            id TEXT PRIMARY KEY,
            display_name TEXT NOT NULL,
            pages INTEGER NOT NULL,
            chunks INTEGER NOT NULL,
            imported_at TEXT NOT NULL,
            file_path TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sources_imported ON sources(imported_at);

        -- Chunked text for search
        CREATE TABLE IF NOT EXISTS chunks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_id TEXT NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
            chunk_index INTEGER NOT NULL,
            page INTEGER,
            content TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source_id);
        "#,
    )?;

    Ok(())
}
