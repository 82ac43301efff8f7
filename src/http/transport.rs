//! Transport contract consumed by the sync engine

use crate::error::{Error, Result};
use crate::types::QueryParams;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;

/// A single page request relative to the API base URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Path below the base URL (e.g. `/orders/42/refunds`)
    pub path: String,
    /// Query parameters, in the order they are sent
    pub query: QueryParams,
    /// Extra request headers
    pub headers: Vec<(String, String)>,
}

impl PageRequest {
    /// Create a GET request for a path
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Replace all query parameters
    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Look up a query parameter
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A fully-read response
#[derive(Debug, Clone, Default)]
pub struct PageResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw response body
    pub body: String,
}

impl PageResponse {
    /// Create a response from its parts
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Client or server error status (>= 400)
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Get a header value as a string (case-insensitive name)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Parse the body as JSON
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body)
            .map_err(|e| Error::decode(format!("Response body is not valid JSON: {e}")))
    }

    /// Convert an error status into an error, keeping a bounded body excerpt
    pub fn error_for_status(&self) -> Error {
        let excerpt: String = self.body.chars().take(512).collect();
        Error::http_status(self.status, excerpt)
    }
}

/// The HTTP collaborator used by the sync engine.
///
/// Implementations own retries, backoff, rate limiting and authentication.
/// A non-success status after retries is returned as a response, not an error,
/// so the pagination strategy can decide what it means.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and read the full response
    async fn send(&self, request: &PageRequest) -> Result<PageResponse>;
}
