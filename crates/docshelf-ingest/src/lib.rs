//! Docshelf Ingest - Ingestion orchestration core.
//!
//! This crate provides:
//! - The `Library` facade: import, search, delete, catalog listing
//! - A single serialized worker driving multi-phase ingestion
//! - The progress ledger with per-document observable event streams
//! - Crash resume from on-disk pending markers
//!
//! All mutation of the document store and the indexing engine passes
//! through one worker task; callers communicate over channels and observe
//! phase progress asynchronously.

mod error;
mod ledger;
mod library;
mod resume;
mod scheduler;

pub use error::{IngestError, IngestResult};
pub use ledger::ProgressStream;
pub use library::Library;
