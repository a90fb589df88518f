//! Core domain types for docshelf.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Content-hash identity of a document (lowercase hex SHA-256).
///
/// Doubles as the document's external id and dedup key: byte-identical
/// inputs always map to the same id regardless of filename or import time.
pub type DocumentId = String;

/// Kind of stored document; determines the stored file extension and
/// which loader the indexing engine applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Text => "text",
        }
    }

    /// The file extension used in the managed documents directory.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Text => "txt",
        }
    }

    /// Map a stored/storage extension back to a kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "txt" | "text" | "md" => Some(DocumentKind::Text),
            _ => None,
        }
    }

    /// Detect the kind of an incoming file, defaulting to PDF when the
    /// extension is missing or unrecognized.
    pub fn from_source_extension(ext: Option<&str>) -> Self {
        ext.and_then(Self::from_extension).unwrap_or(DocumentKind::Pdf)
    }

    /// All kinds, in the order `exists`-style probes check them.
    pub fn all() -> &'static [DocumentKind] {
        &[DocumentKind::Pdf, DocumentKind::Text]
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a document's ingestion.
///
/// Phases advance strictly in declaration order; `Completed` and `Failed`
/// are terminal. `Idle` is the rest state for a document with no active or
/// historical ingestion and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Idle,
    Queued,
    Extracting,
    Ocr,
    Chunking,
    Writing,
    Completed,
    Failed(String),
}

impl IngestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStatus::Idle => "idle",
            IngestStatus::Queued => "queued",
            IngestStatus::Extracting => "extracting",
            IngestStatus::Ocr => "ocr",
            IngestStatus::Chunking => "chunking",
            IngestStatus::Writing => "writing",
            IngestStatus::Completed => "completed",
            IngestStatus::Failed(_) => "failed",
        }
    }

    /// A terminal status admits no further phase transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, IngestStatus::Completed | IngestStatus::Failed(_))
    }
}

impl std::fmt::Display for IngestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestStatus::Failed(reason) => write!(f, "failed: {}", reason),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// A single progress update broadcast to observers and recorded as the
/// document's latest status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestProgress {
    pub status: IngestStatus,
    pub message: Option<String>,
    pub at: DateTime<Utc>,
}

impl IngestProgress {
    pub fn new(status: IngestStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            at: Utc::now(),
        }
    }
}

/// In-memory projection of a document as shown in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub title: String,
    pub kind: DocumentKind,
    pub pages: Option<u32>,
    pub chunks: u32,
    pub size_bytes: u64,
    pub status: IngestStatus,
    pub updated_at: DateTime<Utc>,
    /// Resolved location of the stored file in the managed directory.
    pub path: PathBuf,
}

impl DocumentSummary {
    /// Placeholder created the moment an import is accepted.
    pub fn placeholder(
        id: DocumentId,
        title: impl Into<String>,
        kind: DocumentKind,
        size_bytes: u64,
        path: PathBuf,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            kind,
            pages: None,
            chunks: 0,
            size_bytes,
            status: IngestStatus::Queued,
            updated_at: Utc::now(),
            path,
        }
    }
}

/// A ranked search hit returned by the indexing engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSnippet {
    pub source_id: DocumentId,
    pub excerpt: String,
    pub score: f64,
    pub page: Option<u32>,
}

/// Chunking parameters handed to the engine on every ingest call.
///
/// Process-wide constants in this core, not user-configurable.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Target size of each chunk in characters.
    pub target_chars: usize,
    /// Number of characters carried over between adjacent chunks.
    pub overlap_chars: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            target_chars: 1200,
            overlap_chars: 120,
        }
    }
}
