//! Docshelf Index - SQLite-backed reference implementation of the
//! indexing-engine boundary.
//!
//! Extraction, chunking and search live here, behind the `IndexEngine`
//! trait; the ingestion core never depends on this crate directly.

mod chunker;
mod database;
mod error;
mod extract;
mod migrations;
mod operations;

pub use chunker::{Chunk, Chunker};
pub use database::SqliteIndex;
pub use error::{IndexError, IndexResult};

use docshelf_core::{
    ChunkConfig, EngineError, EngineResult, IndexEngine, IngestReport, IngestSource,
    ScoredSnippet, SourceEntry,
};

impl IndexEngine for SqliteIndex {
    fn ingest(
        &self,
        source: IngestSource,
        source_id: &str,
        config: &ChunkConfig,
    ) -> EngineResult<IngestReport> {
        self.index_source(source, source_id, config)
            .map_err(EngineError::from)
    }

    fn search(&self, query: &str, limit: usize) -> EngineResult<Vec<ScoredSnippet>> {
        self.search_chunks(query, limit).map_err(EngineError::from)
    }

    fn list_sources(&self) -> EngineResult<Vec<SourceEntry>> {
        self.all_sources().map_err(EngineError::from)
    }

    fn delete_source(&self, id: &str) -> EngineResult<()> {
        self.remove_source(id).map_err(EngineError::from)
    }
}
