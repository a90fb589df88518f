//! Content chunking for indexing.
//!
//! Splits extracted page text into overlapping chunks sized for retrieval.

use docshelf_core::ChunkConfig;

/// One chunk of indexed text.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub chunk_index: u32,
    /// 1-based page the chunk came from; `None` for pageless sources.
    pub page: Option<u32>,
    pub content: String,
}

/// Content chunker for splitting extracted text.
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    /// Create a new chunker with the given configuration.
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// Chunk a document's pages, numbering chunks across the whole
    /// document. Empty pages produce no chunks.
    pub fn chunk_pages(&self, pages: &[String]) -> Vec<Chunk> {
        let paged = pages.len() > 1;
        let mut chunks = Vec::new();
        let mut index = 0u32;

        for (page_no, text) in pages.iter().enumerate() {
            for content in self.split_text(text) {
                chunks.push(Chunk {
                    chunk_index: index,
                    page: paged.then_some(page_no as u32 + 1),
                    content,
                });
                index += 1;
            }
        }

        chunks
    }

    /// Split text into chunks near the target size, preferring paragraph
    /// boundaries and carrying a character overlap between chunks.
    fn split_text(&self, text: &str) -> Vec<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return vec![];
        }

        if trimmed.chars().count() <= self.config.target_chars {
            return vec![trimmed.to_string()];
        }

        let mut out = Vec::new();
        let mut current = String::new();

        for para in trimmed.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            let para_len = para.chars().count();
            let current_len = current.chars().count();

            if current_len > 0 && current_len + para_len + 2 > self.config.target_chars {
                self.flush(&mut out, &mut current);
            }

            if para_len > self.config.target_chars {
                // A single oversized paragraph gets a forced character split.
                for piece in self.force_split(para) {
                    let piece_len = piece.chars().count();
                    let current_len = current.chars().count();
                    if current_len > 0 && current_len + piece_len + 1 > self.config.target_chars {
                        self.flush(&mut out, &mut current);
                    }
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(&piece);
                }
            } else {
                if !current.is_empty() {
                    current.push_str("\n\n");
                }
                current.push_str(para);
            }
        }

        let last = current.trim();
        if !last.is_empty() {
            out.push(last.to_string());
        }

        out
    }

    /// Push the current chunk and seed the next one with the overlap tail.
    fn flush(&self, out: &mut Vec<String>, current: &mut String) {
        let chunk = current.trim().to_string();
        if !chunk.is_empty() {
            out.push(chunk);
        }

        if self.config.overlap_chars > 0 {
            let chars: Vec<char> = current.chars().collect();
            let skip = chars.len().saturating_sub(self.config.overlap_chars);
            *current = chars[skip..].iter().collect();
        } else {
            current.clear();
        }
    }

    fn force_split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut result = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = std::cmp::min(start + self.config.target_chars, chars.len());
            result.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start = end.saturating_sub(self.config.overlap_chars).max(start + 1);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ChunkConfig {
        ChunkConfig {
            target_chars: 100,
            overlap_chars: 20,
        }
    }

    #[test]
    fn test_small_text_single_chunk() {
        let chunker = Chunker::new(ChunkConfig::default());
        let pages = vec!["This is a small piece of text.".to_string()];
        let chunks = chunker.chunk_pages(&pages);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "This is a small piece of text.");
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].page, None);
    }

    #[test]
    fn test_large_text_multiple_chunks() {
        let chunker = Chunker::new(small_config());
        let text = "First paragraph with some words here.\n\n\
                    Second paragraph with more words in it.\n\n\
                    Third paragraph still going on and on.\n\n\
                    Fourth paragraph to push past the limit."
            .to_string();

        let chunks = chunker.chunk_pages(&[text]);
        assert!(chunks.len() > 1, "expected multiple chunks, got {}", chunks.len());
        for chunk in &chunks {
            assert!(!chunk.content.is_empty());
        }
    }

    #[test]
    fn test_pages_carry_page_numbers() {
        let chunker = Chunker::new(small_config());
        let pages = vec![
            "Page one content.".to_string(),
            String::new(),
            "Page three content.".to_string(),
        ];

        let chunks = chunker.chunk_pages(&pages);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page, Some(1));
        assert_eq!(chunks[1].page, Some(3));
        // Indices run across the document
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[1].chunk_index, 1);
    }

    #[test]
    fn test_oversized_paragraph_force_split() {
        let chunker = Chunker::new(small_config());
        // No paragraph or sentence breaks at all
        let blob = "x".repeat(450);

        let chunks = chunker.chunk_pages(&[blob]);
        assert!(chunks.len() >= 4);
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 150);
        }
    }

    #[test]
    fn test_utf8_safety() {
        let chunker = Chunker::new(ChunkConfig {
            target_chars: 30,
            overlap_chars: 10,
        });
        let text = "Hello ─── World! Unicode: 日本語 and more ─ content here, české znaky."
            .to_string();

        // Must not panic on multi-byte boundaries
        let chunks = chunker.chunk_pages(&[text]);
        assert!(!chunks.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let chunker = Chunker::new(ChunkConfig::default());
        assert!(chunker.chunk_pages(&[]).is_empty());
        assert!(chunker.chunk_pages(&["   ".to_string()]).is_empty());
    }
}
