//! Delete command.

use super::{open_library, resolve_id};
use anyhow::{Context, Result};
use colored::Colorize;

pub async fn run(id: &str) -> Result<()> {
    let (_, library) = open_library().await?;
    let id = resolve_id(&library, id)?;

    library
        .delete(&id)
        .await
        .context("Failed to delete document")?;

    println!(
        "{} {}",
        "Deleted:".green().bold(),
        &id[..12.min(id.len())]
    );
    Ok(())
}
