//! Command-line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Normalize documents into numbered section trees with ordered content.
#[derive(Debug, Parser)]
#[command(name = "doc-ingest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "DOC_INGEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process one file and print its section tree as JSON
    Ingest(IngestArgs),

    /// Process every accepted file in a directory
    Batch(BatchArgs),
}

#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// File to process
    pub file: PathBuf,

    /// Declared MIME type, used when the extension is not recognised
    #[arg(long)]
    pub content_type: Option<String>,

    /// Write the JSON view here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct BatchArgs {
    /// Directory containing the documents
    pub dir: PathBuf,
}
