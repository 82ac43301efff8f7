//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// WooCommerce extractor
#[derive(Parser, Debug)]
#[command(name = "tap-woo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON or YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// State file (JSON), read at start and rewritten on every commit
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Output directory for Parquet files
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Streams to sync (comma-separated), overriding the config
    #[arg(long, global = true)]
    pub streams: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Stream names given with `--streams`
    pub fn stream_list(&self) -> Option<Vec<String>> {
        self.streams.as_deref().map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect()
        })
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the catalog of available streams
    Discover,

    /// Sync the selected streams
    #[command(alias = "read")]
    Sync,

    /// Test the credentials with one request
    Check,

    /// List stream names
    Streams,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Singer messages, one JSON object per line on stdout
    Json,
    /// Parquet files per stream
    Parquet,
}
