//! List command - show the document catalog.

use super::{format_size, open_library};
use anyhow::Result;
use colored::Colorize;
use docshelf_core::IngestStatus;

pub async fn run() -> Result<()> {
    let (config, library) = open_library().await?;
    let documents = library.documents();

    if documents.is_empty() {
        println!("{}", "The library is empty.".dimmed());
        println!("Use {} to add a document.", "docshelf import <path>".cyan());
        return Ok(());
    }

    println!("{}", "Documents".cyan().bold());
    println!("{}", "─".repeat(70));

    for doc in &documents {
        let marker = match &doc.status {
            IngestStatus::Completed => "●".green(),
            IngestStatus::Failed(_) => "✗".red(),
            _ => "◐".yellow(),
        };
        println!(
            "{} {} {}",
            marker,
            doc.title.white().bold(),
            format!("[{}]", &doc.id[..12.min(doc.id.len())]).dimmed()
        );

        let pages = doc
            .pages
            .map(|p| format!("{} pages, ", p))
            .unwrap_or_default();
        println!(
            "  {} · {}{} chunks · {} · {}",
            doc.kind,
            pages,
            doc.chunks,
            format_size(doc.size_bytes),
            doc.updated_at
                .format(&config.ui.date_format)
                .to_string()
                .dimmed()
        );
        if let IngestStatus::Failed(reason) = &doc.status {
            println!("  {}", reason.red());
        }
    }

    println!();
    println!(
        "{} document{}",
        documents.len(),
        if documents.len() == 1 { "" } else { "s" }
    );

    Ok(())
}
