//! Docshelf Store - Content-addressed document storage.
//!
//! This crate provides:
//! - Streaming SHA-256 fingerprinting of files and inline content
//! - The deterministic `(identity, kind) -> path` layout of the managed
//!   documents directory
//! - Pending-marker handling used for crash resume

mod error;
mod fingerprint;
mod layout;

pub use error::{StoreError, StoreResult};
pub use fingerprint::{fingerprint_bytes, fingerprint_file};
pub use layout::{DocumentStore, MARKER_SUFFIX};
