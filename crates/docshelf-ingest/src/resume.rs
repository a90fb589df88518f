//! Crash recovery: locate pending markers left behind by an interrupted
//! process and turn them back into ingest candidates.

use docshelf_core::{DocumentId, DocumentKind};
use docshelf_store::DocumentStore;
use std::path::PathBuf;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A marked document whose stored file is still present.
pub(crate) struct ResumeCandidate {
    pub id: DocumentId,
    pub kind: DocumentKind,
    pub path: PathBuf,
}

/// Scan the store root for pending markers.
///
/// Markers that cannot be parsed or whose document file is gone are
/// removed on the spot; they cannot be resumed and would otherwise be
/// rediscovered on every startup.
pub(crate) fn scan_markers(store: &DocumentStore) -> Vec<ResumeCandidate> {
    let mut candidates = Vec::new();

    for entry in WalkDir::new(store.root())
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = match entry.file_name().to_str() {
            Some(name) => name,
            None => continue,
        };
        if !name.ends_with(docshelf_store::MARKER_SUFFIX) {
            continue;
        }

        match DocumentStore::parse_marker_name(name) {
            Some((id, kind)) => {
                let path = store.resolve(&id, kind);
                if path.is_file() {
                    debug!("Found resumable import {} ({})", id, kind);
                    candidates.push(ResumeCandidate { id, kind, path });
                } else {
                    warn!("Dropping marker for missing document {}", id);
                    store.remove_marker(&id, kind);
                }
            }
            None => {
                warn!("Dropping unparseable marker {:?}", name);
                let _ = std::fs::remove_file(entry.path());
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, DocumentStore) {
        let dir = tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("docs"));
        store.ensure_root().unwrap();
        (dir, store)
    }

    #[test]
    fn finds_marker_with_surviving_file() {
        let (_dir, store) = store();
        let id = "a".repeat(64);
        store.materialize_text("hello", &id).unwrap();
        store.write_marker(&id, DocumentKind::Text).unwrap();

        let found = scan_markers(&store);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
        assert_eq!(found[0].kind, DocumentKind::Text);
        assert!(found[0].path.is_file());
    }

    #[test]
    fn removes_marker_for_missing_document() {
        let (_dir, store) = store();
        let id = "b".repeat(64);
        store.write_marker(&id, DocumentKind::Pdf).unwrap();

        let found = scan_markers(&store);
        assert!(found.is_empty());
        assert!(!store.marker_exists(&id, DocumentKind::Pdf));
    }

    #[test]
    fn removes_unparseable_marker() {
        let (_dir, store) = store();
        let bogus = store.root().join("not-a-real-marker.pending");
        std::fs::write(&bogus, b"").unwrap();

        let found = scan_markers(&store);
        assert!(found.is_empty());
        assert!(!bogus.exists());
    }

    #[test]
    fn ignores_ordinary_files() {
        let (_dir, store) = store();
        let id = "c".repeat(64);
        store.materialize_text("just content, no marker", &id).unwrap();

        assert!(scan_markers(&store).is_empty());
    }
}
