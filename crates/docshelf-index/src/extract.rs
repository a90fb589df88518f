//! Text extraction for supported source kinds.

use crate::error::{IndexError, IndexResult};
use docshelf_core::IngestSource;
use tracing::debug;

/// Extraction output handed to the chunker.
#[derive(Debug)]
pub struct Extracted {
    pub display_name: String,
    /// Per-page text; a text source is one logical page. A page may be
    /// empty when it carried no extractable text (image-only).
    pub pages: Vec<String>,
}

/// Extract per-page text from an ingest source.
pub fn extract(source: &IngestSource) -> IndexResult<Extracted> {
    match source {
        IngestSource::Pdf { path } => {
            if !path.exists() {
                return Err(IndexError::Extraction {
                    path: path.clone(),
                    message: "file does not exist".to_string(),
                });
            }

            debug!("Extracting PDF: {}", path.display());

            let raw = pdf_extract::extract_text(path).map_err(|e| IndexError::Extraction {
                path: path.clone(),
                message: format!("failed to extract text from PDF: {}", e),
            })?;

            // Form feeds delimit pages in the extractor's output.
            let mut pages: Vec<String> = raw.split('\x0C').map(clean_page_text).collect();

            // A trailing form feed is a delimiter, not an extra page.
            if pages.len() > 1 && pages.last().map(|p| p.is_empty()).unwrap_or(false) {
                pages.pop();
            }

            let display_name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Untitled")
                .to_string();

            debug!(
                "Extracted {} pages from {}",
                pages.len(),
                path.display()
            );

            Ok(Extracted {
                display_name,
                pages,
            })
        }
        IngestSource::Text { content, name } => Ok(Extracted {
            display_name: name.clone(),
            pages: vec![content.trim().to_string()],
        }),
    }
}

/// Clean up one page of extracted text.
fn clean_page_text(text: &str) -> String {
    text.lines()
        .map(|line| line.trim())
        .fold(Vec::new(), |mut acc, line| {
            let last_was_empty = acc.last().map(|s: &String| s.is_empty()).unwrap_or(false);
            if !(line.is_empty() && last_was_empty) {
                acc.push(line.to_string());
            }
            acc
        })
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_page_text() {
        let messy = "  Hello  \n\n\n\nWorld  \n\nTest";
        let cleaned = clean_page_text(messy);
        assert!(!cleaned.contains("\n\n\n"));
        assert!(cleaned.starts_with("Hello"));
        assert!(cleaned.ends_with("Test"));
    }

    #[test]
    fn test_extract_text_source() {
        let source = IngestSource::Text {
            content: "  inline note body  ".to_string(),
            name: "My Note".to_string(),
        };

        let extracted = extract(&source).unwrap();
        assert_eq!(extracted.display_name, "My Note");
        assert_eq!(extracted.pages, vec!["inline note body".to_string()]);
    }

    #[test]
    fn test_extract_missing_pdf_errors() {
        let source = IngestSource::Pdf {
            path: "/nonexistent/missing.pdf".into(),
        };
        assert!(matches!(
            extract(&source),
            Err(IndexError::Extraction { .. })
        ));
    }
}
