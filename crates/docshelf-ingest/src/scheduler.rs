//! The serialized ingest worker.
//!
//! One task owns all mutation of the document store, the progress ledger,
//! the in-memory catalog and the indexing engine. Callers submit commands
//! over a channel and get replies over oneshots; multi-phase ingestion
//! work is queued behind the accept and observed through the ledger.

use crate::error::{IngestError, IngestResult};
use crate::ledger::{ProgressLedger, ProgressStream};
use crate::resume;
use chrono::{DateTime, Utc};
use docshelf_core::{
    ChunkConfig, DocumentId, DocumentKind, DocumentSummary, EngineError, IndexEngine,
    IngestProgress, IngestSource, IngestStatus, ScoredSnippet,
};
use docshelf_store::{fingerprint_bytes, fingerprint_file, DocumentStore};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Shared view of the catalog records, read from any context.
pub(crate) type Records = Arc<RwLock<HashMap<DocumentId, DocumentSummary>>>;

/// Most recent non-fatal operation error, cleared by the consumer.
pub(crate) type LastError = Arc<Mutex<Option<String>>>;

/// An accepted import: the identity plus a progress stream subscribed
/// before any phase work could run.
pub(crate) struct AcceptedImport {
    pub id: DocumentId,
    pub progress: ProgressStream,
}

/// One unit of background ingestion work.
pub(crate) struct IngestJob {
    id: DocumentId,
    kind: DocumentKind,
    path: PathBuf,
    title: String,
}

/// Commands processed by the worker, strictly in arrival order.
pub(crate) enum Command {
    ImportFile {
        path: PathBuf,
        reply: oneshot::Sender<IngestResult<AcceptedImport>>,
    },
    ImportText {
        title: String,
        content: String,
        reply: oneshot::Sender<IngestResult<AcceptedImport>>,
    },
    Search {
        query: String,
        limit: usize,
        reply: oneshot::Sender<IngestResult<Vec<ScoredSnippet>>>,
    },
    Delete {
        id: DocumentId,
        reply: oneshot::Sender<IngestResult<()>>,
    },
    /// Startup recovery: reconcile the catalog and re-admit marked
    /// documents. Replies with the number of resumed ingestions.
    Recover {
        reply: oneshot::Sender<IngestResult<usize>>,
    },
    Ingest(IngestJob),
}

pub(crate) struct Worker {
    engine: Arc<dyn IndexEngine>,
    store: DocumentStore,
    ledger: Arc<ProgressLedger>,
    records: Records,
    last_error: LastError,
    chunk_config: ChunkConfig,
    self_tx: mpsc::UnboundedSender<Command>,
}

/// Spawn the worker task and return its command channel.
pub(crate) fn spawn(
    engine: Arc<dyn IndexEngine>,
    store: DocumentStore,
    ledger: Arc<ProgressLedger>,
    records: Records,
    last_error: LastError,
) -> mpsc::UnboundedSender<Command> {
    let (tx, rx) = mpsc::unbounded_channel();

    let worker = Worker {
        engine,
        store,
        ledger,
        records,
        last_error,
        chunk_config: ChunkConfig::default(),
        self_tx: tx.clone(),
    };
    tokio::spawn(worker.run(rx));

    tx
}

impl Worker {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        debug!("ingest worker started");
        while let Some(cmd) = rx.recv().await {
            match cmd {
                Command::ImportFile { path, reply } => {
                    let result = self.accept_file(&path);
                    self.finish_accept(result, reply);
                }
                Command::ImportText {
                    title,
                    content,
                    reply,
                } => {
                    let result = self.accept_text(&title, &content);
                    self.finish_accept(result, reply);
                }
                Command::Search {
                    query,
                    limit,
                    reply,
                } => {
                    let result = self.run_search(query, limit).await;
                    let _ = reply.send(result);
                }
                Command::Delete { id, reply } => {
                    let result = self.run_delete(&id).await;
                    let _ = reply.send(result);
                }
                Command::Recover { reply } => {
                    let result = self.run_recover().await;
                    let _ = reply.send(result);
                }
                Command::Ingest(job) => self.run_ingest(job).await,
            }
        }
        debug!("ingest worker stopped");
    }

    /// Reply to an accept, queueing the background job on success.
    fn finish_accept(
        &self,
        result: IngestResult<(AcceptedImport, Option<IngestJob>)>,
        reply: oneshot::Sender<IngestResult<AcceptedImport>>,
    ) {
        match result {
            Ok((accepted, job)) => {
                let _ = reply.send(Ok(accepted));
                if let Some(job) = job {
                    let _ = self.self_tx.send(Command::Ingest(job));
                }
            }
            Err(e) => {
                self.note_error(&e.to_string());
                let _ = reply.send(Err(e));
            }
        }
    }

    /// Import preparation for a file: fingerprint, dedup check, copy into
    /// the store, pending marker, placeholder record.
    fn accept_file(
        &self,
        source: &std::path::Path,
    ) -> IngestResult<(AcceptedImport, Option<IngestJob>)> {
        let id = fingerprint_file(source)?;
        let kind =
            DocumentKind::from_source_extension(source.extension().and_then(|e| e.to_str()));
        let title = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Untitled")
            .to_string();

        if self.store.exists(&id) {
            return Ok((self.accept_duplicate(&id), None));
        }

        let size = std::fs::metadata(source)?.len();
        let dest = self.store.materialize(source, &id, kind)?;
        self.store.write_marker(&id, kind)?;

        info!("Accepted import {} as {} ({})", source.display(), id, kind);
        Ok(self.admit(id, title, kind, size, dest, "queued for import"))
    }

    /// Import preparation for inline text.
    fn accept_text(
        &self,
        title: &str,
        content: &str,
    ) -> IngestResult<(AcceptedImport, Option<IngestJob>)> {
        if content.trim().is_empty() {
            return Err(IngestError::InvalidInput(
                "text content is empty".to_string(),
            ));
        }

        let id = fingerprint_bytes(content.as_bytes());

        if self.store.exists(&id) {
            return Ok((self.accept_duplicate(&id), None));
        }

        let dest = self.store.materialize_text(content, &id)?;
        self.store.write_marker(&id, DocumentKind::Text)?;
        let size = content.len() as u64;

        info!("Accepted text import {:?} as {}", title, id);
        Ok(self.admit(
            id,
            title.to_string(),
            DocumentKind::Text,
            size,
            dest,
            "queued for import",
        ))
    }

    /// Register a freshly admitted document and subscribe its stream.
    fn admit(
        &self,
        id: DocumentId,
        title: String,
        kind: DocumentKind,
        size: u64,
        path: PathBuf,
        queued_message: &str,
    ) -> (AcceptedImport, Option<IngestJob>) {
        {
            let mut records = self.records.write().expect("records lock poisoned");
            records.insert(
                id.clone(),
                DocumentSummary::placeholder(id.clone(), &title, kind, size, path.clone()),
            );
        }
        self.set_status(&id, IngestStatus::Queued, Some(queued_message.to_string()));

        let progress = self
            .ledger
            .observe(&id)
            .expect("status was just recorded");

        let job = IngestJob {
            id: id.clone(),
            kind,
            path,
            title,
        };
        (AcceptedImport { id, progress }, Some(job))
    }

    /// Byte-identical content is already in the store: short-circuit to a
    /// terminal status without touching the pipeline.
    fn accept_duplicate(&self, id: &str) -> AcceptedImport {
        // If the existing copy is still mid-ingestion, attach the caller to
        // that run instead of emitting a conflicting terminal event.
        if let Some(latest) = self.ledger.latest(id) {
            if !latest.status.is_terminal() {
                debug!("Duplicate import of in-flight document {}", id);
                let progress = self.ledger.observe(id).expect("entry exists");
                return AcceptedImport {
                    id: id.to_string(),
                    progress,
                };
            }
        }

        let (path, kind) = self.store.locate(id);
        {
            let mut records = self.records.write().expect("records lock poisoned");
            if !records.contains_key(id) {
                // Known on disk but not yet reconciled (fresh process).
                let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
                let mut summary = DocumentSummary::placeholder(
                    id.to_string(),
                    short_id(id),
                    kind,
                    size,
                    path,
                );
                summary.status = IngestStatus::Completed;
                records.insert(id.to_string(), summary);
            }
        }

        info!("Duplicate import skipped for {}", id);
        self.ledger.record(
            id,
            IngestProgress::new(
                IngestStatus::Completed,
                Some("duplicate content; already in library".to_string()),
            ),
        );
        let progress = self.ledger.observe(id).expect("entry exists");
        AcceptedImport {
            id: id.to_string(),
            progress,
        }
    }

    /// Drive one document through the ingest phases.
    async fn run_ingest(&mut self, job: IngestJob) {
        let IngestJob {
            id,
            kind,
            path,
            title,
        } = job;

        self.set_status(
            &id,
            IngestStatus::Extracting,
            Some("extracting text".to_string()),
        );

        let source = match kind {
            DocumentKind::Pdf => IngestSource::Pdf { path: path.clone() },
            DocumentKind::Text => match std::fs::read_to_string(&path) {
                Ok(content) => IngestSource::Text {
                    content,
                    name: title.clone(),
                },
                Err(e) => {
                    self.finish_failed(&id, format!("failed to read stored file: {}", e))
                        .await;
                    return;
                }
            },
        };

        let engine = Arc::clone(&self.engine);
        let config = self.chunk_config.clone();
        let engine_id = id.clone();
        let outcome =
            tokio::task::spawn_blocking(move || engine.ingest(source, &engine_id, &config)).await;

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                self.finish_failed(&id, format!("ingest task panicked: {}", e))
                    .await;
                return;
            }
        };

        match result {
            Ok(report) => {
                if report.ocr_pages > 0 {
                    self.set_status(
                        &id,
                        IngestStatus::Ocr,
                        Some(format!(
                            "recognized {} image-only page(s)",
                            report.ocr_pages
                        )),
                    );
                }
                self.set_status(
                    &id,
                    IngestStatus::Chunking,
                    Some(format!("split into {} chunks", report.chunks)),
                );
                self.set_status(
                    &id,
                    IngestStatus::Writing,
                    Some("writing to index".to_string()),
                );

                {
                    let mut records = self.records.write().expect("records lock poisoned");
                    if let Some(record) = records.get_mut(&id) {
                        record.pages = Some(report.pages);
                        record.chunks = report.chunks;
                    }
                }

                self.store.remove_marker(&id, kind);
                self.set_status(
                    &id,
                    IngestStatus::Completed,
                    Some(format!(
                        "{} pages, {} chunks",
                        report.pages, report.chunks
                    )),
                );
                info!(
                    "Ingested {} ({} pages, {} chunks)",
                    id, report.pages, report.chunks
                );

                self.refresh_catalog().await;
            }
            Err(e) => {
                warn!("Ingest failed for {}: {}", id, e);
                self.finish_failed(&id, e.to_string()).await;
            }
        }
    }

    /// Terminal failure: stored copy and marker removed, status recorded.
    /// The copy must not survive, or a later import of the same bytes
    /// would deduplicate against content the index never received.
    async fn finish_failed(&mut self, id: &str, reason: String) {
        if let Err(e) = self.store.remove_all(id) {
            warn!("Cleanup after failed ingest of {} failed: {}", id, e);
        }
        self.note_error(&reason);
        self.set_status(id, IngestStatus::Failed(reason), None);
        self.refresh_catalog().await;
    }

    async fn run_search(
        &self,
        query: String,
        limit: usize,
    ) -> IngestResult<Vec<ScoredSnippet>> {
        let engine = Arc::clone(&self.engine);
        let outcome = tokio::task::spawn_blocking(move || engine.search(&query, limit)).await;

        let result = match outcome {
            Ok(result) => result.map_err(IngestError::from),
            Err(e) => Err(IngestError::Engine(EngineError::Search(format!(
                "search task panicked: {}",
                e
            )))),
        };

        if let Err(e) = &result {
            self.note_error(&e.to_string());
        }
        result
    }

    /// Deletion: durable delete first, then files and markers, then the
    /// in-memory state. An engine failure aborts the whole deletion.
    async fn run_delete(&self, id: &str) -> IngestResult<()> {
        let engine = Arc::clone(&self.engine);
        let engine_id = id.to_string();
        let outcome =
            tokio::task::spawn_blocking(move || engine.delete_source(&engine_id)).await;

        let engine_result = match outcome {
            Ok(result) => result,
            Err(e) => Err(EngineError::Storage(format!("delete task panicked: {}", e))),
        };

        match engine_result {
            // A document the engine never saw (e.g. a failed ingest) still
            // has local state to clean up.
            Err(EngineError::UnknownSource(_)) => {
                debug!("Deleting {} with no durable source", id)
            }
            Err(e) => {
                self.note_error(&e.to_string());
                return Err(e.into());
            }
            Ok(()) => {}
        }

        self.store.remove_all(id)?;
        self.ledger.purge(id);
        {
            let mut records = self.records.write().expect("records lock poisoned");
            records.remove(id);
        }
        self.refresh_catalog().await;

        info!("Deleted document {}", id);
        Ok(())
    }

    /// Startup recovery: populate the catalog from the durable listing,
    /// then re-admit every marked document whose file survived.
    async fn run_recover(&mut self) -> IngestResult<usize> {
        self.refresh_catalog().await;

        let candidates = resume::scan_markers(&self.store);
        let mut resumed = 0usize;

        for candidate in candidates {
            let size = std::fs::metadata(&candidate.path)
                .map(|m| m.len())
                .unwrap_or(0);
            let title = short_id(&candidate.id).to_string();

            {
                let mut records = self.records.write().expect("records lock poisoned");
                records.insert(
                    candidate.id.clone(),
                    DocumentSummary::placeholder(
                        candidate.id.clone(),
                        &title,
                        candidate.kind,
                        size,
                        candidate.path.clone(),
                    ),
                );
            }
            self.set_status(
                &candidate.id,
                IngestStatus::Queued,
                Some("resuming interrupted import".to_string()),
            );

            let _ = self.self_tx.send(Command::Ingest(IngestJob {
                id: candidate.id,
                kind: candidate.kind,
                path: candidate.path,
                title,
            }));
            resumed += 1;
        }

        if resumed > 0 {
            info!("Resumed {} interrupted ingestion(s)", resumed);
        }
        Ok(resumed)
    }

    /// Rebuild the catalog by merging the engine's durable listing with
    /// records known only in memory. Idempotent.
    async fn refresh_catalog(&self) {
        let engine = Arc::clone(&self.engine);
        let listing = match tokio::task::spawn_blocking(move || engine.list_sources()).await {
            Ok(Ok(listing)) => listing,
            Ok(Err(e)) => {
                warn!("Catalog refresh failed: {}", e);
                self.note_error(&e.to_string());
                return;
            }
            Err(e) => {
                warn!("Catalog refresh task panicked: {}", e);
                return;
            }
        };

        let mut merged: HashMap<DocumentId, DocumentSummary> = HashMap::new();
        for entry in listing {
            let (path, kind) = self.store.locate(&entry.id);
            let latest = self.ledger.latest(&entry.id);
            let status = latest
                .as_ref()
                .map(|p| p.status.clone())
                .unwrap_or(IngestStatus::Completed);
            let updated_at = latest
                .map(|p| p.at)
                .or_else(|| {
                    DateTime::parse_from_rfc3339(&entry.imported_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .ok()
                })
                .unwrap_or_else(Utc::now);
            let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

            merged.insert(
                entry.id.clone(),
                DocumentSummary {
                    id: entry.id,
                    title: entry.display_name,
                    kind,
                    pages: Some(entry.pages),
                    chunks: entry.chunks,
                    size_bytes: size,
                    status,
                    updated_at,
                    path,
                },
            );
        }

        let mut records = self.records.write().expect("records lock poisoned");
        // In-flight or just-failed documents are not durable yet; keep
        // them verbatim.
        for (id, record) in records.iter() {
            if !merged.contains_key(id) {
                merged.insert(id.clone(), record.clone());
            }
        }
        *records = merged;
    }

    /// Record a status in the ledger and mirror it onto the catalog record.
    fn set_status(&self, id: &str, status: IngestStatus, message: Option<String>) {
        self.ledger
            .record(id, IngestProgress::new(status.clone(), message));

        let mut records = self.records.write().expect("records lock poisoned");
        if let Some(record) = records.get_mut(id) {
            record.status = status;
            record.updated_at = Utc::now();
        }
    }

    fn note_error(&self, message: &str) {
        let mut slot = self.last_error.lock().expect("last_error lock poisoned");
        *slot = Some(message.to_string());
    }
}

/// Shortened identity used as a stand-in title when none is known.
fn short_id(id: &str) -> &str {
    &id[..id.len().min(12)]
}
