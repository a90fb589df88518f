//! Note command - add inline text to the library.

use super::open_library;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::PathBuf;

pub async fn run(title: &str, file: Option<PathBuf>) -> Result<()> {
    let content = match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };

    let (_, library) = open_library().await?;
    let (id, stream) = library
        .import_text_watched(title, content)
        .await
        .context("Failed to add note")?;

    super::import::watch_progress(&library, &id, stream).await
}
