//! Managed documents directory layout.
//!
//! Documents live at `<root>/<identity>.<ext>` with `ext` derived from the
//! document kind. A colocated `<identity>.<ext>.pending` marker exists
//! exactly while that document's ingestion has not reached a terminal
//! state; its presence on disk is the sole durability signal for resume.

use crate::error::{StoreError, StoreResult};
use docshelf_core::{DocumentId, DocumentKind};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Suffix appended to a stored document path to form its pending marker.
pub const MARKER_SUFFIX: &str = ".pending";

/// Deterministic mapping from document identity to on-disk location.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Create a store over the managed documents directory. No I/O.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the managed directory if it is missing.
    pub fn ensure_root(&self) -> StoreResult<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Pure mapping `(identity, kind) -> storage path`.
    pub fn resolve(&self, id: &str, kind: DocumentKind) -> PathBuf {
        self.root.join(format!("{}.{}", id, kind.extension()))
    }

    /// Marker path for a stored document.
    pub fn marker_path(&self, id: &str, kind: DocumentKind) -> PathBuf {
        let mut name = self.resolve(id, kind).into_os_string();
        name.push(MARKER_SUFFIX);
        PathBuf::from(name)
    }

    /// Whether a file for this identity exists under any kind.
    pub fn exists(&self, id: &str) -> bool {
        DocumentKind::all()
            .iter()
            .any(|kind| self.resolve(id, *kind).exists())
    }

    /// Locate a stored document when the kind is not known, probing all
    /// kinds and returning the first match.
    ///
    /// Falls back to the default kind's path when nothing is on disk. That
    /// fallback is a deliberate approximation for callers that need *some*
    /// path, not a guarantee the file exists.
    pub fn locate(&self, id: &str) -> (PathBuf, DocumentKind) {
        for kind in DocumentKind::all() {
            let path = self.resolve(id, *kind);
            if path.exists() {
                return (path, *kind);
            }
        }
        (self.resolve(id, DocumentKind::Pdf), DocumentKind::Pdf)
    }

    /// Copy a source file into its managed location, overwriting any stale
    /// file already there.
    ///
    /// On failure nothing visible is left behind: no marker has been
    /// written yet and a partial copy is removed.
    pub fn materialize(
        &self,
        source: &Path,
        id: &str,
        kind: DocumentKind,
    ) -> StoreResult<PathBuf> {
        self.ensure_root()?;
        let dest = self.resolve(id, kind);

        if let Err(e) = std::fs::copy(source, &dest) {
            // Remove any partial copy before surfacing the error.
            let _ = std::fs::remove_file(&dest);
            return Err(StoreError::CopyFailed {
                path: source.to_path_buf(),
                message: e.to_string(),
            });
        }

        debug!("Materialized {} -> {}", source.display(), dest.display());
        Ok(dest)
    }

    /// Write inline text content into its managed location.
    pub fn materialize_text(&self, content: &str, id: &str) -> StoreResult<PathBuf> {
        self.ensure_root()?;
        let dest = self.resolve(id, DocumentKind::Text);
        std::fs::write(&dest, content)?;
        Ok(dest)
    }

    /// Write the pending marker for a stored document.
    pub fn write_marker(&self, id: &str, kind: DocumentKind) -> StoreResult<()> {
        std::fs::write(self.marker_path(id, kind), b"")?;
        Ok(())
    }

    /// Remove the pending marker; a missing marker is not an error.
    pub fn remove_marker(&self, id: &str, kind: DocumentKind) {
        let path = self.marker_path(id, kind);
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove marker {}: {}", path.display(), e);
            }
        }
    }

    pub fn marker_exists(&self, id: &str, kind: DocumentKind) -> bool {
        self.marker_path(id, kind).exists()
    }

    /// Remove all physical files and markers for an identity across every
    /// kind. Used by deletion after the engine's durable delete succeeded,
    /// and by failed-ingest cleanup.
    pub fn remove_all(&self, id: &str) -> StoreResult<()> {
        for kind in DocumentKind::all() {
            for path in [self.resolve(id, *kind), self.marker_path(id, *kind)] {
                if let Err(e) = std::fs::remove_file(&path) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        return Err(StoreError::Io(e));
                    }
                }
            }
        }
        Ok(())
    }

    /// Parse a marker filename back into `(identity, kind)`.
    ///
    /// Returns `None` for anything that is not `<id>.<ext>.pending` with a
    /// recognized extension.
    pub fn parse_marker_name(file_name: &str) -> Option<(DocumentId, DocumentKind)> {
        let stem = file_name.strip_suffix(MARKER_SUFFIX)?;
        let (id, ext) = stem.rsplit_once('.')?;
        if id.is_empty() {
            return None;
        }
        let kind = DocumentKind::from_extension(ext)?;
        Some((id.to_string(), kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_is_deterministic() {
        let store = DocumentStore::new("/data/documents");
        assert_eq!(
            store.resolve("abc123", DocumentKind::Pdf),
            PathBuf::from("/data/documents/abc123.pdf")
        );
        assert_eq!(
            store.resolve("abc123", DocumentKind::Text),
            PathBuf::from("/data/documents/abc123.txt")
        );
        assert_eq!(
            store.marker_path("abc123", DocumentKind::Pdf),
            PathBuf::from("/data/documents/abc123.pdf.pending")
        );
    }

    #[test]
    fn test_materialize_and_exists() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("docs"));

        let src = dir.path().join("in.pdf");
        std::fs::write(&src, b"%PDF-1.4 fake").unwrap();

        assert!(!store.exists("id1"));
        let dest = store.materialize(&src, "id1", DocumentKind::Pdf).unwrap();
        assert!(dest.exists());
        assert!(store.exists("id1"));

        let (located, kind) = store.locate("id1");
        assert_eq!(located, dest);
        assert_eq!(kind, DocumentKind::Pdf);
    }

    #[test]
    fn test_locate_falls_back_to_default_kind() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::new(dir.path());

        let (path, kind) = store.locate("unknown");
        assert_eq!(kind, DocumentKind::Pdf);
        assert!(path.to_string_lossy().ends_with("unknown.pdf"));
    }

    #[test]
    fn test_materialize_failure_leaves_nothing() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("docs"));

        let missing = dir.path().join("absent.pdf");
        let result = store.materialize(&missing, "id2", DocumentKind::Pdf);
        assert!(matches!(result, Err(StoreError::CopyFailed { .. })));
        assert!(!store.exists("id2"));
        assert!(!store.marker_exists("id2", DocumentKind::Pdf));
    }

    #[test]
    fn test_marker_lifecycle() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        store.ensure_root().unwrap();

        store.write_marker("id3", DocumentKind::Text).unwrap();
        assert!(store.marker_exists("id3", DocumentKind::Text));

        store.remove_marker("id3", DocumentKind::Text);
        assert!(!store.marker_exists("id3", DocumentKind::Text));

        // Removing again is a no-op.
        store.remove_marker("id3", DocumentKind::Text);
    }

    #[test]
    fn test_remove_all_clears_files_and_markers() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        store.ensure_root().unwrap();

        let src = dir.path().join("src.txt");
        std::fs::write(&src, "text").unwrap();
        store.materialize(&src, "id4", DocumentKind::Text).unwrap();
        store.write_marker("id4", DocumentKind::Text).unwrap();

        store.remove_all("id4").unwrap();
        assert!(!store.exists("id4"));
        assert!(!store.marker_exists("id4", DocumentKind::Text));
    }

    #[test]
    fn test_parse_marker_name() {
        assert_eq!(
            DocumentStore::parse_marker_name("abc.pdf.pending"),
            Some(("abc".to_string(), DocumentKind::Pdf))
        );
        assert_eq!(
            DocumentStore::parse_marker_name("abc.txt.pending"),
            Some(("abc".to_string(), DocumentKind::Text))
        );
        assert_eq!(DocumentStore::parse_marker_name("abc.docx.pending"), None);
        assert_eq!(DocumentStore::parse_marker_name("abc.pdf"), None);
        assert_eq!(DocumentStore::parse_marker_name(".pdf.pending"), None);
    }
}
