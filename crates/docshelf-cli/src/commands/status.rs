//! Status command - library overview.

use super::{format_size, get_paths, open_library};
use anyhow::Result;
use colored::Colorize;
use docshelf_core::IngestStatus;

pub async fn run() -> Result<()> {
    let (_, paths) = get_paths()?;

    println!("{}", "Docshelf Status".cyan().bold());
    println!("{}", "─".repeat(50));
    println!();
    println!("  Config:    {}", paths.config_file.display());
    println!("  Documents: {}", paths.documents_dir.display());
    println!("  Index:     {}", paths.index_file.display());

    if !paths.is_initialized() {
        println!();
        println!(
            "{}",
            "Not initialized. Run 'docshelf init' first.".yellow()
        );
        return Ok(());
    }

    let (_, library) = open_library().await?;
    let documents = library.documents();

    let mut completed = 0usize;
    let mut in_flight = 0usize;
    let mut failed = 0usize;
    let mut total_bytes = 0u64;
    for doc in &documents {
        total_bytes += doc.size_bytes;
        match &doc.status {
            IngestStatus::Completed => completed += 1,
            IngestStatus::Failed(_) => failed += 1,
            _ => in_flight += 1,
        }
    }

    println!();
    println!("{}", "Library".white().bold());
    println!("  {} Completed: {}", "●".green(), completed);
    if in_flight > 0 {
        println!("  {} In progress: {}", "◐".yellow(), in_flight);
    }
    if failed > 0 {
        println!("  {} Failed: {}", "✗".red(), failed);
    }
    println!("  Total size: {}", format_size(total_bytes));

    if let Some(error) = library.take_last_error() {
        println!();
        println!("{} {}", "Last error:".red().bold(), error);
    }

    if documents.is_empty() {
        println!();
        println!(
            "{}",
            "The library is empty. Use 'docshelf import <path>' to add content.".dimmed()
        );
    }

    Ok(())
}
