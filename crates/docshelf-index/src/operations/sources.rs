//! Source ingest, listing and deletion.

use crate::chunker::Chunker;
use crate::database::SqliteIndex;
use crate::error::{IndexError, IndexResult};
use crate::extract;
use chrono::Utc;
use docshelf_core::{ChunkConfig, IngestReport, IngestSource, SourceEntry};
use rusqlite::params;
use tracing::{debug, info};

impl SqliteIndex {
    /// Extract, chunk and index one source under the given id.
    ///
    /// Re-ingesting an existing id replaces its rows.
    pub fn index_source(
        &self,
        source: IngestSource,
        source_id: &str,
        config: &ChunkConfig,
    ) -> IndexResult<IngestReport> {
        let extracted = extract::extract(&source)?;

        let ocr_pages = extracted
            .pages
            .iter()
            .filter(|p| p.trim().is_empty())
            .count() as u32;
        let pages = extracted.pages.len() as u32;

        let chunks = Chunker::new(config.clone()).chunk_pages(&extracted.pages);

        let file_path = match &source {
            IngestSource::Pdf { path } => path.to_string_lossy().to_string(),
            IngestSource::Text { .. } => String::new(),
        };

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM sources WHERE id = ?1", params![source_id])?;
        tx.execute(
            r#"
            INSERT INTO sources (id, display_name, pages, chunks, imported_at, file_path)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                source_id,
                extracted.display_name,
                pages,
                chunks.len() as u32,
                Utc::now().to_rfc3339(),
                file_path,
            ],
        )?;

        for chunk in &chunks {
            tx.execute(
                "INSERT INTO chunks (source_id, chunk_index, page, content) VALUES (?1, ?2, ?3, ?4)",
                params![source_id, chunk.chunk_index, chunk.page, chunk.content],
            )?;
        }

        tx.commit()?;

        info!(
            "Indexed source {} ({} pages, {} chunks)",
            source_id,
            pages,
            chunks.len()
        );

        Ok(IngestReport {
            pages,
            chunks: chunks.len() as u32,
            ocr_pages,
        })
    }

    /// The durable source listing, most recent first.
    pub fn all_sources(&self) -> IndexResult<Vec<SourceEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, display_name, pages, chunks, imported_at, file_path
             FROM sources ORDER BY imported_at DESC",
        )?;

        let entries = stmt
            .query_map([], |row| {
                let file_path: String = row.get(5)?;
                Ok(SourceEntry {
                    id: row.get(0)?,
                    display_name: row.get(1)?,
                    pages: row.get(2)?,
                    chunks: row.get(3)?,
                    imported_at: row.get(4)?,
                    file_path: file_path.into(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Remove one source and its chunks; errors if the id is unknown.
    pub fn remove_source(&self, id: &str) -> IndexResult<()> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM sources WHERE id = ?1", params![id])?;

        if rows == 0 {
            return Err(IndexError::NotFound(id.to_string()));
        }

        debug!("Removed source {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_source(content: &str, name: &str) -> IngestSource {
        IngestSource::Text {
            content: content.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_index_and_list() {
        let index = SqliteIndex::open_in_memory().unwrap();
        let report = index
            .index_source(
                text_source("Some note content about rust.", "Rust note"),
                "id-a",
                &ChunkConfig::default(),
            )
            .unwrap();

        assert_eq!(report.pages, 1);
        assert_eq!(report.chunks, 1);
        assert_eq!(report.ocr_pages, 0);

        let sources = index.all_sources().unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].id, "id-a");
        assert_eq!(sources[0].display_name, "Rust note");
        assert_eq!(sources[0].chunks, 1);
        // RFC 3339 parseable
        assert!(chrono::DateTime::parse_from_rfc3339(&sources[0].imported_at).is_ok());
    }

    #[test]
    fn test_reingest_replaces_rows() {
        let index = SqliteIndex::open_in_memory().unwrap();
        let config = ChunkConfig::default();

        index
            .index_source(text_source("first version", "v1"), "id-b", &config)
            .unwrap();
        index
            .index_source(text_source("second version", "v2"), "id-b", &config)
            .unwrap();

        let sources = index.all_sources().unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].display_name, "v2");
    }

    #[test]
    fn test_remove_unknown_source_errors() {
        let index = SqliteIndex::open_in_memory().unwrap();
        assert!(matches!(
            index.remove_source("missing"),
            Err(IndexError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_source_clears_chunks() {
        let index = SqliteIndex::open_in_memory().unwrap();
        index
            .index_source(
                text_source("to be deleted", "gone"),
                "id-c",
                &ChunkConfig::default(),
            )
            .unwrap();

        index.remove_source("id-c").unwrap();
        assert!(index.all_sources().unwrap().is_empty());
        assert!(index.search_chunks("deleted", 10).unwrap().is_empty());
    }
}
