//! Ranked full-text search over indexed chunks.

use crate::database::SqliteIndex;
use crate::error::IndexResult;
use docshelf_core::ScoredSnippet;
use tracing::debug;

const EXCERPT_CHARS: usize = 240;

impl SqliteIndex {
    /// Naive term-frequency search: score every chunk by how often the
    /// query terms occur, normalized by chunk length.
    ///
    /// An empty or whitespace query returns an empty result set.
    pub fn search_chunks(&self, query: &str, limit: usize) -> IndexResult<Vec<ScoredSnippet>> {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();

        if terms.is_empty() || limit == 0 {
            return Ok(vec![]);
        }

        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT source_id, page, content FROM chunks")?;

        let rows = stmt
            .query_map([], |row| {
                let source_id: String = row.get(0)?;
                let page: Option<u32> = row.get(1)?;
                let content: String = row.get(2)?;
                Ok((source_id, page, content))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut hits: Vec<ScoredSnippet> = rows
            .into_iter()
            .filter_map(|(source_id, page, content)| {
                let (score, first_match) = score_chunk(&content, &terms)?;
                Some(ScoredSnippet {
                    source_id,
                    excerpt: excerpt_around(&content, first_match),
                    score,
                    page,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);

        debug!("Search for {:?} returned {} hits", query, hits.len());
        Ok(hits)
    }
}

/// Score one chunk; `None` when no term occurs at all.
///
/// Returns the score and the byte offset of the first matching term.
fn score_chunk(content: &str, terms: &[String]) -> Option<(f64, usize)> {
    let lowered = content.to_lowercase();
    let mut total_hits = 0usize;
    let mut first_match = usize::MAX;

    for term in terms {
        let mut offset = 0;
        while let Some(pos) = lowered[offset..].find(term.as_str()) {
            total_hits += 1;
            first_match = first_match.min(offset + pos);
            offset += pos + term.len();
        }
    }

    if total_hits == 0 {
        return None;
    }

    let length = lowered.chars().count().max(1) as f64;
    Some((total_hits as f64 / length.sqrt(), first_match))
}

/// Cut an excerpt around the first match, respecting char boundaries.
fn excerpt_around(content: &str, first_match: usize) -> String {
    // Walk back to a boundary at most half the excerpt before the match.
    let mut start = first_match.saturating_sub(EXCERPT_CHARS / 2);
    while start > 0 && !content.is_char_boundary(start) {
        start -= 1;
    }

    let tail: String = content[start..].chars().take(EXCERPT_CHARS).collect();
    let mut excerpt = String::new();
    if start > 0 {
        excerpt.push_str("...");
    }
    excerpt.push_str(tail.trim());
    if content[start..].chars().count() > EXCERPT_CHARS {
        excerpt.push_str("...");
    }
    excerpt
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshelf_core::{ChunkConfig, IngestSource};

    fn seeded_index() -> SqliteIndex {
        let index = SqliteIndex::open_in_memory().unwrap();
        let config = ChunkConfig::default();

        let docs = [
            ("doc-1", "The Rust borrow checker enforces ownership rules."),
            ("doc-2", "Python uses reference counting and a garbage collector."),
            ("doc-3", "Rust and Python can interoperate through FFI. Rust is fast."),
        ];
        for (id, content) in docs {
            index
                .index_source(
                    IngestSource::Text {
                        content: content.to_string(),
                        name: id.to_string(),
                    },
                    id,
                    &config,
                )
                .unwrap();
        }
        index
    }

    #[test]
    fn test_empty_query_returns_empty() {
        let index = seeded_index();
        assert!(index.search_chunks("", 5).unwrap().is_empty());
        assert!(index.search_chunks("   ", 5).unwrap().is_empty());
    }

    #[test]
    fn test_search_ranks_and_limits() {
        let index = seeded_index();

        let hits = index.search_chunks("rust", 5).unwrap();
        assert_eq!(hits.len(), 2);
        // doc-3 mentions rust twice and should rank first
        assert_eq!(hits[0].source_id, "doc-3");
        assert!(hits[0].score >= hits[1].score);

        let limited = index.search_chunks("rust", 1).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let index = seeded_index();
        let hits = index.search_chunks("RUST", 5).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_no_match_returns_empty() {
        let index = seeded_index();
        assert!(index.search_chunks("haskell", 5).unwrap().is_empty());
    }

    #[test]
    fn test_excerpt_contains_match() {
        let index = seeded_index();
        let hits = index.search_chunks("borrow", 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].excerpt.to_lowercase().contains("borrow"));
    }

    #[test]
    fn test_excerpt_around_utf8() {
        let content = "předmluva ".repeat(60);
        let pos = content.find("mluva").unwrap();
        // Must not panic on multi-byte boundaries
        let excerpt = excerpt_around(&content, pos);
        assert!(!excerpt.is_empty());
    }
}
