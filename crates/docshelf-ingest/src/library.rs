//! Public facade over the ingest worker.
//!
//! A `Library` owns the command channel to the single worker task plus
//! shared read views of the progress ledger and the catalog. All handles
//! are cheap to clone.

use crate::error::{IngestError, IngestResult};
use crate::ledger::{ProgressLedger, ProgressStream};
use crate::scheduler::{self, AcceptedImport, Command, LastError, Records};
use docshelf_core::{DocumentId, DocumentSummary, IndexEngine, IngestStatus, ScoredSnippet};
use docshelf_store::DocumentStore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::{mpsc, oneshot};

/// The document library: import, search, list and delete, backed by an
/// indexing engine and a managed documents directory.
#[derive(Clone)]
pub struct Library {
    tx: mpsc::UnboundedSender<Command>,
    ledger: Arc<ProgressLedger>,
    records: Records,
    last_error: LastError,
}

impl Library {
    /// Open the library: spawn the worker and run startup recovery, which
    /// reconciles the catalog and re-queues interrupted ingestions.
    pub async fn open(
        engine: Arc<dyn IndexEngine>,
        documents_dir: impl Into<PathBuf>,
    ) -> IngestResult<Self> {
        let store = DocumentStore::new(documents_dir);
        store.ensure_root()?;

        let ledger = Arc::new(ProgressLedger::new());
        let records: Records = Arc::new(RwLock::new(HashMap::new()));
        let last_error: LastError = Arc::new(Mutex::new(None));

        let tx = scheduler::spawn(
            engine,
            store,
            Arc::clone(&ledger),
            Arc::clone(&records),
            Arc::clone(&last_error),
        );

        let library = Self {
            tx,
            ledger,
            records,
            last_error,
        };
        library
            .request(|reply| Command::Recover { reply })
            .await?;
        Ok(library)
    }

    /// Import a file from disk. Returns once the document is accepted
    /// (fingerprinted and copied into the store); ingestion continues in
    /// the background and can be followed with [`Library::observe`].
    pub async fn import_file(&self, path: impl AsRef<Path>) -> IngestResult<DocumentId> {
        Ok(self.import_file_watched(path).await?.0)
    }

    /// Import a file and return a progress stream subscribed before any
    /// ingest phase runs, so the full phase sequence is observable.
    pub async fn import_file_watched(
        &self,
        path: impl AsRef<Path>,
    ) -> IngestResult<(DocumentId, ProgressStream)> {
        let path = path.as_ref().to_path_buf();
        let accepted = self
            .request(|reply| Command::ImportFile { path, reply })
            .await?;
        Ok(split(accepted))
    }

    /// Import inline text under a display title.
    pub async fn import_text(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> IngestResult<DocumentId> {
        Ok(self.import_text_watched(title, content).await?.0)
    }

    /// Watched variant of [`Library::import_text`].
    pub async fn import_text_watched(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> IngestResult<(DocumentId, ProgressStream)> {
        let title = title.into();
        let content = content.into();
        let accepted = self
            .request(|reply| Command::ImportText {
                title,
                content,
                reply,
            })
            .await?;
        Ok(split(accepted))
    }

    /// Search the index. A blank query is a no-op that never reaches the
    /// engine.
    pub async fn search(
        &self,
        query: impl Into<String>,
        limit: usize,
    ) -> IngestResult<Vec<ScoredSnippet>> {
        let query = query.into();
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.request(|reply| Command::Search {
            query,
            limit,
            reply,
        })
        .await
    }

    /// Delete a document everywhere: index, stored file, marker, catalog.
    /// If the engine delete fails, nothing local is removed.
    pub async fn delete(&self, id: impl Into<DocumentId>) -> IngestResult<()> {
        let id = id.into();
        self.request(|reply| Command::Delete { id, reply }).await
    }

    /// Subscribe to a document's progress. Replays the latest known
    /// status first, then yields live updates until a terminal one.
    pub fn observe(&self, id: &str) -> IngestResult<ProgressStream> {
        self.ledger
            .observe(id)
            .ok_or_else(|| IngestError::NotFound(id.to_string()))
    }

    /// Current status of a document; `Idle` when it was never seen.
    pub fn status(&self, id: &str) -> IngestStatus {
        self.ledger.status(id)
    }

    /// Snapshot of the catalog, most recently updated first.
    pub fn documents(&self) -> Vec<DocumentSummary> {
        let records = self.records.read().expect("records lock poisoned");
        let mut list: Vec<DocumentSummary> = records.values().cloned().collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        list
    }

    /// Take (and clear) the most recent background error, if any.
    pub fn take_last_error(&self) -> Option<String> {
        let mut slot = self.last_error.lock().expect("last_error lock poisoned");
        slot.take()
    }

    /// Send a command and await its oneshot reply.
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<IngestResult<T>>) -> Command,
    ) -> IngestResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .map_err(|_| IngestError::WorkerStopped)?;
        reply_rx.await.map_err(|_| IngestError::WorkerStopped)?
    }
}

fn split(accepted: AcceptedImport) -> (DocumentId, ProgressStream) {
    (accepted.id, accepted.progress)
}
