//! CLI command implementations.

pub mod delete;
pub mod import;
pub mod init;
pub mod list;
pub mod note;
pub mod search;
pub mod status;

use anyhow::{Context, Result};
use docshelf_config::{AppPaths, Config};
use docshelf_core::IndexEngine;
use docshelf_index::SqliteIndex;
use docshelf_ingest::Library;
use std::sync::Arc;

/// Load the configuration and resolve the application paths.
pub fn get_paths() -> Result<(Config, AppPaths)> {
    let config = Config::load().context("Failed to load configuration")?;
    let paths = config
        .resolve_paths()
        .context("Failed to determine application directories")?;
    Ok((config, paths))
}

/// Open the library, ensuring docshelf is initialized.
pub async fn open_library() -> Result<(Config, Library)> {
    let (config, paths) = get_paths()?;

    if !paths.is_initialized() {
        anyhow::bail!("Docshelf is not initialized. Run 'docshelf init' first.");
    }

    let engine =
        SqliteIndex::open(&paths.index_file).context("Failed to open the search index")?;
    let library = Library::open(Arc::new(engine) as Arc<dyn IndexEngine>, paths.documents_dir)
        .await
        .context("Failed to open the document library")?;

    Ok((config, library))
}

/// Resolve a possibly-shortened document id against the catalog.
pub fn resolve_id(library: &Library, prefix: &str) -> Result<String> {
    let matches: Vec<String> = library
        .documents()
        .into_iter()
        .map(|d| d.id)
        .filter(|id| id.starts_with(prefix))
        .collect();

    match matches.len() {
        0 => anyhow::bail!("No document matches id '{}'", prefix),
        1 => Ok(matches.into_iter().next().unwrap()),
        n => anyhow::bail!("Id '{}' is ambiguous ({} matches)", prefix, n),
    }
}

/// Format a file size in human-readable form.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
