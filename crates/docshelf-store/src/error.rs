//! Store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Copy into store failed for {path}: {message}")]
    CopyFailed { path: PathBuf, message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;
