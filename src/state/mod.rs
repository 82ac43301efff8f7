//! State management module
//!
//! Handles bookmark tracking and checkpointing so that incremental streams
//! resume from their last high-water mark.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` - persisted bookmarks per stream and per partition
//! - `StateManager` - file-based state persistence
//! - `HighWaterMark` - the monotonic replication-key tracker of one partition

mod bookmark;
mod manager;
mod types;

pub use bookmark::{compare_replication_values, format_api_timestamp, parse_timestamp, HighWaterMark};
pub use manager::StateManager;
pub use types::{PartitionState, State, StreamState};

#[cfg(test)]
mod manager_tests;
