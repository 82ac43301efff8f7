//! Engine types
//!
//! Run configuration and statistics of the sync engine.

use crate::stream::QueryOptions;
use serde::Serialize;

/// Configuration for sync operation
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Page size and date window sent with every request
    pub query: QueryOptions,
    /// Starting value for incremental partitions without a bookmark
    pub start_date: Option<String>,
    /// Commit the high-water mark after every page, not only at partition end
    pub state_per_page: bool,
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query options
    #[must_use]
    pub fn with_query(mut self, query: QueryOptions) -> Self {
        self.query = query;
        self
    }

    /// Set the start date
    #[must_use]
    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self
    }

    /// Commit state after each page
    #[must_use]
    pub fn with_state_per_page(mut self, enabled: bool) -> Self {
        self.state_per_page = enabled;
        self
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Records emitted to the sink
    pub records_emitted: usize,
    /// Records read, including those of walked-only parents
    pub records_read: usize,
    /// Total pages fetched
    pub pages_fetched: usize,
    /// Pages answered with an error status
    pub error_pages: usize,
    /// Partitions completed
    pub partitions_synced: usize,
    /// Root streams completed
    pub streams_synced: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&mut self, records: usize) {
        self.pages_fetched += 1;
        self.records_read += records;
    }

    pub fn add_error_page(&mut self) {
        self.error_pages += 1;
    }

    pub fn add_record(&mut self) {
        self.records_emitted += 1;
    }

    pub fn add_partition(&mut self) {
        self.partitions_synced += 1;
    }

    pub fn add_stream(&mut self) {
        self.streams_synced += 1;
    }

    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
