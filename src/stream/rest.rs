//! The stream capability trait and its REST implementation

use super::definition::StreamDefinition;
use crate::decode::{JsonDecoder, RecordDecoder};
use crate::error::{Error, Result};
use crate::http::PageResponse;
use crate::pagination::{PageToken, PaginationConfig, Paginator};
use crate::partition::PartitionContext;
use crate::state::{format_api_timestamp, parse_timestamp};
use crate::template;
use crate::types::{JsonObject, QueryParams};
use chrono::{DateTime, Utc};
use tracing::warn;

/// Run-wide settings that shape every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Page size (`per_page`)
    pub per_page: u32,
    /// Upper bound sent as `modified_before` to incremental streams
    pub end_date: Option<DateTime<Utc>>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            per_page: 100,
            end_date: None,
        }
    }
}

/// What the sync engine needs from a stream.
///
/// Only [`Stream::definition`] and [`Stream::paginator`] are required; the
/// provided methods implement the WooCommerce REST conventions on top of the
/// definition and can be overridden per stream.
pub trait Stream: Send + Sync + std::fmt::Debug {
    /// Static definition of the stream
    fn definition(&self) -> &StreamDefinition;

    /// A fresh paginator for one partition
    fn paginator(&self) -> Box<dyn Paginator>;

    /// Stream name
    fn name(&self) -> &str {
        &self.definition().name
    }

    /// Bind the path template with the partition context
    fn request_path(&self, context: &PartitionContext) -> Result<String> {
        template::render(&self.definition().path, context)
    }

    /// Query parameters for one page request.
    ///
    /// `token` is the page to fetch (`None` for the first page) and
    /// `starting_value` the resolved bookmark or start date.
    fn build_query_params(
        &self,
        token: Option<&PageToken>,
        starting_value: Option<&str>,
        options: &QueryOptions,
    ) -> Result<QueryParams> {
        let mut params: QueryParams = vec![
            ("per_page".to_string(), options.per_page.to_string()),
            ("order".to_string(), "asc".to_string()),
        ];

        if self.definition().is_incremental() {
            if let Some(start) = starting_value {
                params.push(("modified_after".to_string(), api_timestamp(start)));
            }
            if let Some(end) = &options.end_date {
                params.push(("modified_before".to_string(), format_api_timestamp(end)));
            }
        }

        if let Some(token) = token {
            let page = token.page_param().ok_or_else(|| {
                Error::pagination(format!("next page link carries no page number: {token}"))
            })?;
            params.push(("page".to_string(), page));
        }

        Ok(params)
    }

    /// Decode the records of a successful response
    fn parse_records(&self, response: &PageResponse) -> Result<Vec<JsonObject>> {
        JsonDecoder::from_path(self.definition().records_path.as_deref()).decode(&response.body)
    }

    /// Apply the stream's transforms to one record
    fn post_process(&self, record: JsonObject, context: &PartitionContext) -> Result<JsonObject> {
        let definition = self.definition();
        definition
            .transforms
            .iter()
            .try_fold(record, |record, transform| transform.apply(definition, record, context))
    }

    /// Partition context for the children of one record, if any
    fn child_context(
        &self,
        record: &JsonObject,
        context: &PartitionContext,
    ) -> Result<Option<PartitionContext>> {
        match &self.definition().child_context {
            Some(router) => router.route(self.name(), record, context),
            None => Ok(None),
        }
    }
}

/// Normalize a starting value to the API timestamp format
fn api_timestamp(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => format_api_timestamp(&dt),
        None => {
            warn!("Starting value '{value}' is not a timestamp, sending it unchanged");
            value.to_string()
        }
    }
}

/// A WooCommerce REST collection endpoint
#[derive(Debug, Clone)]
pub struct RestStream {
    definition: StreamDefinition,
    pagination: PaginationConfig,
}

impl RestStream {
    /// Create a stream; the definition's own pagination wins over `default_pagination`
    pub fn new(definition: StreamDefinition, default_pagination: &PaginationConfig) -> Self {
        let pagination = definition
            .pagination
            .clone()
            .unwrap_or_else(|| default_pagination.clone());
        Self {
            definition,
            pagination,
        }
    }

    /// Pagination strategy in effect
    pub fn pagination(&self) -> &PaginationConfig {
        &self.pagination
    }
}

impl Stream for RestStream {
    fn definition(&self) -> &StreamDefinition {
        &self.definition
    }

    fn paginator(&self) -> Box<dyn Paginator> {
        self.pagination.build()
    }
}
