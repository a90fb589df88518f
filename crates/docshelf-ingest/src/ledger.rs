//! The progress ledger.
//!
//! The single place that knows the current ingestion status of every
//! document since process start, and the fan-out point for observers.
//! Writes are confined to the scheduler worker; readers get snapshots or
//! subscribe for future events.

use docshelf_core::{DocumentId, IngestProgress, IngestStatus};
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::broadcast;
use tracing::trace;

const EVENT_CHANNEL_CAPACITY: usize = 64;

struct Entry {
    latest: IngestProgress,
    tx: broadcast::Sender<IngestProgress>,
}

/// In-memory mapping from document id to latest phase, with per-document
/// broadcast streams. Never treated as durable.
#[derive(Default)]
pub struct ProgressLedger {
    inner: RwLock<HashMap<DocumentId, Entry>>,
}

impl ProgressLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new status as the latest for `id` and fan it out to
    /// subscribers. Called only from the scheduler worker.
    pub(crate) fn record(&self, id: &str, progress: IngestProgress) {
        trace!("progress {}: {}", id, progress.status);
        let mut inner = self.inner.write().expect("ledger lock poisoned");

        let entry = inner.entry(id.to_string()).or_insert_with(|| {
            let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
            Entry {
                latest: progress.clone(),
                tx,
            }
        });

        entry.latest = progress.clone();
        // No receivers is fine; latest is still queryable.
        let _ = entry.tx.send(progress);
    }

    /// Latest known progress for a document, if any was ever recorded.
    pub fn latest(&self, id: &str) -> Option<IngestProgress> {
        let inner = self.inner.read().expect("ledger lock poisoned");
        inner.get(id).map(|e| e.latest.clone())
    }

    /// Current status of a document, `Idle` if unknown.
    pub fn status(&self, id: &str) -> IngestStatus {
        self.latest(id)
            .map(|p| p.status)
            .unwrap_or(IngestStatus::Idle)
    }

    /// Subscribe to a document's progress.
    ///
    /// The stream starts from the most recent known status, so a late
    /// subscriber still sees current state, and ends once a terminal
    /// status has been delivered.
    pub fn observe(&self, id: &str) -> Option<ProgressStream> {
        // The read lock spans snapshot and subscribe so no event can fall
        // between them.
        let inner = self.inner.read().expect("ledger lock poisoned");
        inner.get(id).map(|entry| ProgressStream {
            first: Some(entry.latest.clone()),
            rx: entry.tx.subscribe(),
            done: false,
        })
    }

    /// Forget a document entirely (explicit deletion).
    pub(crate) fn purge(&self, id: &str) {
        let mut inner = self.inner.write().expect("ledger lock poisoned");
        inner.remove(id);
    }
}

/// A live, append-only view of one document's progress events.
pub struct ProgressStream {
    first: Option<IngestProgress>,
    rx: broadcast::Receiver<IngestProgress>,
    done: bool,
}

impl ProgressStream {
    /// Next progress event; `None` after a terminal event was delivered
    /// or the ledger entry went away.
    pub async fn next(&mut self) -> Option<IngestProgress> {
        if self.done {
            return None;
        }

        if let Some(first) = self.first.take() {
            self.done = first.status.is_terminal();
            return Some(first);
        }

        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    self.done = event.status.is_terminal();
                    return Some(event);
                }
                // A slow observer only cares about the freshest state.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(status: IngestStatus) -> IngestProgress {
        IngestProgress::new(status, None)
    }

    #[test]
    fn test_latest_and_status() {
        let ledger = ProgressLedger::new();
        assert_eq!(ledger.status("x"), IngestStatus::Idle);

        ledger.record("x", progress(IngestStatus::Queued));
        ledger.record("x", progress(IngestStatus::Extracting));

        assert_eq!(ledger.status("x"), IngestStatus::Extracting);
        assert_eq!(ledger.latest("x").unwrap().status, IngestStatus::Extracting);
    }

    #[test]
    fn test_purge_forgets_document() {
        let ledger = ProgressLedger::new();
        ledger.record("a", progress(IngestStatus::Completed));
        ledger.purge("a");
        assert_eq!(ledger.status("a"), IngestStatus::Idle);
        assert!(ledger.observe("a").is_none());
    }

    #[tokio::test]
    async fn test_observe_replays_latest_then_live_events() {
        let ledger = ProgressLedger::new();
        ledger.record("a", progress(IngestStatus::Queued));

        let mut stream = ledger.observe("a").unwrap();
        assert_eq!(stream.next().await.unwrap().status, IngestStatus::Queued);

        ledger.record("a", progress(IngestStatus::Extracting));
        ledger.record("a", progress(IngestStatus::Completed));

        assert_eq!(
            stream.next().await.unwrap().status,
            IngestStatus::Extracting
        );
        assert_eq!(stream.next().await.unwrap().status, IngestStatus::Completed);
        // Terminal status ends the stream.
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_terminal_state() {
        let ledger = ProgressLedger::new();
        ledger.record("a", progress(IngestStatus::Queued));
        ledger.record("a", progress(IngestStatus::Completed));

        let mut stream = ledger.observe("a").unwrap();
        assert_eq!(stream.next().await.unwrap().status, IngestStatus::Completed);
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn test_observe_unknown_id() {
        let ledger = ProgressLedger::new();
        assert!(ledger.observe("nope").is_none());
    }
}
