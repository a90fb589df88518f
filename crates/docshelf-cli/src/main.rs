//! Docshelf CLI - Local document knowledge base

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Docshelf - Local document knowledge base
#[derive(Parser)]
#[command(name = "docshelf")]
#[command(version)]
#[command(about = "Import, search and manage a local document library", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize docshelf (create config, documents directory and index)
    Init,

    /// Import a file into the library
    Import {
        /// Path to the file to import
        path: std::path::PathBuf,
    },

    /// Add a quick text note
    Note {
        /// Note title
        title: String,

        /// Read the note body from a file (otherwise from stdin)
        #[arg(short, long)]
        file: Option<std::path::PathBuf>,
    },

    /// Search the library
    Search {
        /// Search query
        query: String,

        /// Maximum results (default from config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List all documents
    List,

    /// Delete a document by id (or unique id prefix)
    Delete {
        /// Document id
        id: String,
    },

    /// Show library status
    Status,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docshelf=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docshelf=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Import { path } => commands::import::run(&path).await,
        Commands::Note { title, file } => commands::note::run(&title, file).await,
        Commands::Search { query, limit } => commands::search::run(&query, limit).await,
        Commands::List => commands::list::run().await,
        Commands::Delete { id } => commands::delete::run(&id).await,
        Commands::Status => commands::status::run().await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
