//! Import command - add a file to the library.

use super::open_library;
use anyhow::{Context, Result};
use colored::Colorize;
use docshelf_core::IngestStatus;
use docshelf_ingest::{Library, ProgressStream};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

pub async fn run(path: &Path) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("Not a file: {}", path.display());
    }

    let (_, library) = open_library().await?;

    let (id, stream) = library
        .import_file_watched(path)
        .await
        .context("Failed to import file")?;

    println!("{} {}", "Importing:".cyan().bold(), path.display());
    watch_progress(&library, &id, stream).await
}

/// Drive a spinner from the progress stream until a terminal status.
pub async fn watch_progress(
    library: &Library,
    id: &str,
    mut stream: ProgressStream,
) -> Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let mut outcome = library.status(id);
    while let Some(progress) = stream.next().await {
        let label = match &progress.message {
            Some(message) => format!("{}: {}", progress.status, message),
            None => progress.status.to_string(),
        };
        pb.set_message(label);
        outcome = progress.status;
    }

    match outcome {
        IngestStatus::Completed => {
            pb.finish_and_clear();
            println!("{} {}", "Imported:".green().bold(), &id[..12.min(id.len())]);
            if let Some(doc) = library.documents().into_iter().find(|d| d.id == id) {
                if let Some(pages) = doc.pages {
                    println!("  Pages: {}", pages);
                }
                println!("  Chunks: {}", doc.chunks);
                println!("  ID: {}", doc.id);
            }
            Ok(())
        }
        IngestStatus::Failed(reason) => {
            pb.finish_and_clear();
            anyhow::bail!("Import failed: {}", reason);
        }
        other => {
            // The stream ended without a terminal status; should not happen.
            pb.finish_and_clear();
            anyhow::bail!("Import ended unexpectedly in status '{}'", other);
        }
    }
}
