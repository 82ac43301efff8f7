//! Execution engine module
//!
//! Walks the selected streams partition by partition and page by page.
//!
//! # Overview
//!
//! For every partition the engine resolves the starting value (bookmark,
//! else start date), fetches pages until the stream's paginator reports
//! exhaustion, post-processes and emits each record, advances the
//! high-water mark and syncs the child partitions of a record before moving
//! on to the next one. The mark is committed when the partition completes.
//! Once a page is skipped on an error status the mark stops advancing, so
//! the next run fetches the skipped records again.

mod types;

pub use types::{SyncConfig, SyncStats};

use crate::error::{Error, Result};
use crate::http::{PageRequest, Transport};
use crate::output::{Message, RecordSink};
use crate::pagination::PaginationState;
use crate::partition::PartitionContext;
use crate::state::{HighWaterMark, StateManager};
use crate::stream::{QueryOptions, Registry, Selection, Stream};
use crate::template::value_to_string;
use crate::types::JsonObject;
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine<S: RecordSink> {
    transport: Arc<dyn Transport>,
    registry: Registry,
    state: StateManager,
    sink: S,
    config: SyncConfig,
    stats: SyncStats,
}

impl<S: RecordSink> SyncEngine<S> {
    /// Create a new sync engine
    pub fn new(transport: Arc<dyn Transport>, registry: Registry, state: StateManager, sink: S) -> Self {
        Self {
            transport,
            registry,
            state,
            sink,
            config: SyncConfig::default(),
            stats: SyncStats::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the engine, returning its sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Sync every selected stream.
    ///
    /// Emits a SCHEMA message per selected stream, then walks each root
    /// stream the selection needs, and finishes with a STATE message.
    pub async fn sync_all(&mut self, selection: &Selection) -> Result<SyncStats> {
        let start = Instant::now();

        if selection.is_empty() {
            warn!("No streams selected");
        }

        for stream in self.registry.sync_order() {
            if selection.is_selected(stream.name()) {
                self.emit_schema(stream.as_ref())?;
            }
        }

        for root in self.registry.roots() {
            if !selection.is_walked(root.name()) {
                continue;
            }
            info!("Starting sync for stream: {}", root.name());
            self.sync_partition(Arc::clone(&root), PartitionContext::new(), selection)
                .await?;
            self.stats.add_stream();
        }

        self.emit_state().await?;
        self.sink.finish()?;
        self.state.save().await?;

        self.stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            "Sync completed: {} records emitted, {} pages, {} partitions in {}ms",
            self.stats.records_emitted,
            self.stats.pages_fetched,
            self.stats.partitions_synced,
            self.stats.duration_ms
        );
        Ok(self.stats.clone())
    }

    /// Sync one partition of a stream, recursing into child partitions
    fn sync_partition<'a>(
        &'a mut self,
        stream: Arc<dyn Stream>,
        context: PartitionContext,
        selection: &'a Selection,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let name = stream.name().to_string();
            let replication_key = stream.definition().replication_key.clone();
            let emit = selection.is_selected(&name);
            let children: Vec<Arc<dyn Stream>> = self
                .registry
                .children(&name)
                .into_iter()
                .filter(|child| selection.is_walked(child.name()))
                .collect();

            let starting_value = match replication_key {
                Some(_) => self
                    .state
                    .get_bookmark(&name, &context)
                    .await
                    .or_else(|| self.config.start_date.clone()),
                None => None,
            };
            let mut mark = HighWaterMark::new(starting_value.clone());

            let path = stream.request_path(&context)?;
            let paginator = stream.paginator();
            let mut pages = PaginationState::new();

            debug!(
                "Partition {name} [{context}] via {} pagination, starting at {:?}",
                paginator.name(),
                starting_value
            );

            loop {
                let params = stream.build_query_params(
                    pages.token.as_ref(),
                    starting_value.as_deref(),
                    &self.config.query,
                )?;
                let request = PageRequest::get(path.clone()).with_query(params);
                let response = self.transport.send(&request).await?;

                let records = if response.is_error() {
                    self.stats.add_error_page();
                    if mark.hold() && replication_key.is_some() {
                        warn!(
                            "{name} [{context}]: skipped page {} (HTTP {}), bookmark held at {:?}",
                            pages.current_page(),
                            response.status,
                            mark.value()
                        );
                    }
                    Vec::new()
                } else {
                    stream.parse_records(&response)?
                };
                pages.add_page(records.len());
                self.stats.add_page(records.len());
                debug!(
                    "{name}: page {} returned {} records (HTTP {})",
                    pages.current_page(),
                    records.len(),
                    response.status
                );

                for record in records {
                    let record = stream.post_process(record, &context)?;

                    if let Some(field) = &replication_key {
                        match record.get(field) {
                            Some(value) if !value.is_null() => {
                                mark.observe(&value_to_string(value));
                            }
                            _ => debug!("{name}: record without '{field}'"),
                        }
                    }

                    let child_context = if children.is_empty() {
                        None
                    } else {
                        stream.child_context(&record, &context)?
                    };

                    if emit {
                        self.emit_record(stream.as_ref(), record)?;
                    }

                    if let Some(child_context) = child_context {
                        for child in &children {
                            self.sync_partition(Arc::clone(child), child_context.clone(), selection)
                                .await?;
                        }
                    }
                }

                let next = paginator.next_token(&response, &mut pages)?;
                if next.is_done() {
                    break;
                }
                if self.config.state_per_page {
                    self.commit(&name, &context, replication_key.as_deref(), &mark)
                        .await?;
                }
            }

            self.commit(&name, &context, replication_key.as_deref(), &mark)
                .await?;
            self.stats.add_partition();
            info!(
                "Completed partition {name} [{context}]: {} records in {} pages",
                pages.records_fetched, pages.pages_fetched
            );
            Ok(())
        }
        .boxed()
    }

    /// Announce a partition's mark, then persist it once the sink holds its records
    async fn commit(
        &mut self,
        stream: &str,
        context: &PartitionContext,
        replication_key: Option<&str>,
        mark: &HighWaterMark,
    ) -> Result<()> {
        let (Some(replication_key), Some(value)) = (replication_key, mark.value()) else {
            return Ok(());
        };

        self.state
            .set_bookmark(stream, context, replication_key, value)
            .await;
        self.emit_state().await?;
        self.sink.checkpoint()?;
        self.state.save().await
    }

    fn emit_schema(&mut self, stream: &dyn Stream) -> Result<()> {
        let definition = stream.definition();
        self.sink.write(&Message::Schema {
            stream: definition.name.clone(),
            schema: definition.schema.clone(),
            key_properties: definition.primary_key.clone(),
            bookmark_properties: definition.replication_key.iter().cloned().collect(),
        })
    }

    fn emit_record(&mut self, stream: &dyn Stream, record: JsonObject) -> Result<()> {
        let schema = &stream.definition().schema;

        let mismatches = schema.type_mismatches(&record);
        if !mismatches.is_empty() {
            debug!(
                "{}: fields not matching the declared types: {}",
                stream.name(),
                mismatches.join(", ")
            );
        }

        self.sink.write(&Message::Record {
            stream: stream.name().to_string(),
            record: schema.conform(record),
            time_extracted: Utc::now(),
        })?;
        self.stats.add_record();
        Ok(())
    }

    async fn emit_state(&mut self) -> Result<()> {
        let value = self.state.snapshot().await;
        self.sink.write(&Message::State { value })
    }
}

/// Issue one authenticated single-record request against a stream
pub async fn check_connection(transport: &dyn Transport, stream: &dyn Stream) -> Result<()> {
    let options = QueryOptions {
        per_page: 1,
        end_date: None,
    };
    let request = PageRequest::get(stream.request_path(&PartitionContext::new())?)
        .with_query(stream.build_query_params(None, None, &options)?);

    let response = transport.send(&request).await?;
    if !response.is_success() {
        let excerpt: String = response.body.chars().take(200).collect();
        return Err(Error::ConnectionCheck {
            message: format!("GET {} returned HTTP {}: {excerpt}", request.path, response.status),
        });
    }

    stream.parse_records(&response)?;
    info!("Connection check passed on {}", stream.name());
    Ok(())
}
