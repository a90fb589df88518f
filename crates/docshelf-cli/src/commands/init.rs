//! Initialize docshelf.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use docshelf_config::Config;
use docshelf_index::SqliteIndex;

pub fn run() -> Result<()> {
    let (_, paths) = get_paths()?;

    if paths.is_initialized() {
        println!("{} Docshelf is already initialized.", "Note:".yellow().bold());
        println!("  Config: {}", paths.config_file.display());
        println!("  Documents: {}", paths.documents_dir.display());
        println!("  Index: {}", paths.index_file.display());
        return Ok(());
    }

    println!("{}", "Initializing docshelf...".cyan().bold());

    paths.ensure_dirs().context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    Config::create_default_file(&paths.config_file).context("Failed to create config file")?;
    println!(
        "  {} Created config: {}",
        "✓".green(),
        paths.config_file.display()
    );

    let _index = SqliteIndex::open(&paths.index_file).context("Failed to create search index")?;
    println!(
        "  {} Created index: {}",
        "✓".green(),
        paths.index_file.display()
    );

    println!();
    println!("{}", "Docshelf initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Import a document: {}", "docshelf import paper.pdf".cyan());
    println!("  2. Search the library: {}", "docshelf search \"keyword\"".cyan());
    println!("  3. List documents: {}", "docshelf list".cyan());

    Ok(())
}
