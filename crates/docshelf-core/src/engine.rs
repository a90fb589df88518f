//! Boundary to the external indexing engine.
//!
//! The engine owns text extraction, chunking, indexing and ranked search,
//! plus the durable source listing that is authoritative for completed
//! documents. The ingestion core only ever talks to this trait.

use crate::types::{ChunkConfig, DocumentId, ScoredSnippet};
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by an indexing engine implementation.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine initialization failed: {0}")]
    Init(String),

    #[error("ingest failed: {0}")]
    Ingest(String),

    #[error("search failed: {0}")]
    Search(String),

    #[error("unknown source: {0}")]
    UnknownSource(DocumentId),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Input handed to the engine for one ingest call.
#[derive(Debug, Clone)]
pub enum IngestSource {
    /// A PDF file in the managed documents directory.
    Pdf { path: PathBuf },
    /// Inline text with a display name.
    Text { content: String, name: String },
}

/// What the engine reports back after a successful ingest.
#[derive(Debug, Clone, Copy)]
pub struct IngestReport {
    pub pages: u32,
    pub chunks: u32,
    /// Pages that carried no extractable text (image-only, OCR territory).
    pub ocr_pages: u32,
}

/// One entry of the engine's durable source listing.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    pub id: DocumentId,
    pub display_name: String,
    pub pages: u32,
    pub chunks: u32,
    /// RFC 3339 timestamp of the import.
    pub imported_at: String,
    pub file_path: PathBuf,
}

/// The external indexing engine collaborator.
///
/// Implementations are not assumed safe for concurrent writes; the
/// ingestion core serializes all calls through its single worker.
pub trait IndexEngine: Send + Sync {
    /// Extract, chunk and index one source under the given id.
    fn ingest(
        &self,
        source: IngestSource,
        source_id: &str,
        config: &ChunkConfig,
    ) -> EngineResult<IngestReport>;

    /// Ranked full-text search. An empty query yields an empty result set.
    fn search(&self, query: &str, limit: usize) -> EngineResult<Vec<ScoredSnippet>>;

    /// The durable source listing, authoritative for completed documents.
    fn list_sources(&self) -> EngineResult<Vec<SourceEntry>>;

    /// Remove one source; fails if the id is unknown.
    fn delete_source(&self, id: &str) -> EngineResult<()>;
}
