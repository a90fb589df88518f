//! Search command.

use super::open_library;
use anyhow::{Context, Result};
use colored::Colorize;

pub async fn run(query: &str, limit: Option<usize>) -> Result<()> {
    let (config, library) = open_library().await?;
    let limit = limit.unwrap_or(config.search.default_limit);

    println!("{} \"{}\"", "Searching for:".cyan().bold(), query);
    println!("{}", "─".repeat(70));

    let hits = library
        .search(query, limit)
        .await
        .context("Search failed")?;

    if hits.is_empty() {
        println!();
        println!("{}", "No results found.".dimmed());
        println!();
        println!("Tips:");
        println!("  • Try different keywords");
        println!("  • Use 'docshelf list' to browse the library");
        return Ok(());
    }

    // Resolve titles for the matched documents once.
    let documents = library.documents();

    println!();
    println!(
        "Found {} result{}",
        hits.len().to_string().green(),
        if hits.len() == 1 { "" } else { "s" }
    );
    println!();

    for hit in hits {
        let title = documents
            .iter()
            .find(|d| d.id == hit.source_id)
            .map(|d| d.title.as_str())
            .unwrap_or(&hit.source_id);

        let location = match hit.page {
            Some(page) => format!("p.{}", page),
            None => String::new(),
        };
        println!(
            "{} {} {} {}",
            "•".cyan(),
            title.white().bold(),
            format!("[{}]", &hit.source_id[..8.min(hit.source_id.len())]).dimmed(),
            location.dimmed()
        );
        println!("  {}", hit.excerpt.dimmed());
        println!();
    }

    Ok(())
}
