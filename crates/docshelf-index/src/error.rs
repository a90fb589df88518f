//! Index error types.

use docshelf_core::EngineError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Extraction failed for {path}: {message}")]
    Extraction { path: PathBuf, message: String },

    #[error("Source not found: {0}")]
    NotFound(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Index error: {0}")]
    Other(String),
}

pub type IndexResult<T> = Result<T, IndexError>;

impl From<IndexError> for EngineError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::NotFound(id) => EngineError::UnknownSource(id),
            IndexError::Extraction { .. } => EngineError::Ingest(err.to_string()),
            other => EngineError::Storage(other.to_string()),
        }
    }
}
