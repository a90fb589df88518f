//! Docshelf Core - Core types and domain models for the docshelf knowledge base.

mod engine;
mod types;

pub use engine::{EngineError, EngineResult, IndexEngine, IngestReport, IngestSource, SourceEntry};
pub use types::*;
