//! CLI module
//!
//! # Commands
//!
//! - `discover` - Print the stream catalog
//! - `sync` (alias `read`) - Extract the selected streams
//! - `check` - Test the credentials
//! - `streams` - List stream names

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
