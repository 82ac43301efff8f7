//! Error types for tap-woo
//!
//! One enum covers the whole extractor. Transport failures are retried inside
//! the HTTP client and only surface here once retries are exhausted; every
//! other variant aborts the run.

use thiserror::Error;

/// The main error type for tap-woo
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Invalid YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Transport and upstream status
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Gave up after {max_retries} retries")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Connection check failed: {message}")]
    ConnectionCheck { message: String },

    // ============================================================================
    // Response bodies and records
    // ============================================================================
    #[error("No record array at '{path}': {message}")]
    RecordExtraction { path: String, message: String },

    #[error("Malformed response body: {message}")]
    Decode { message: String },

    #[error("Record in stream '{stream}' is missing field '{field}'")]
    SchemaMismatch { stream: String, field: String },

    #[error("Pagination error: {message}")]
    Pagination { message: String },

    #[error("Partition has no value for '{variable}'")]
    UndefinedVariable { variable: String },

    // ============================================================================
    // Streams
    // ============================================================================
    #[error("Unknown stream '{stream}'")]
    StreamNotFound { stream: String },

    #[error("Invalid stream registry: {message}")]
    Registry { message: String },

    // ============================================================================
    // State and output
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn extraction(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecordExtraction {
            path: path.into(),
            message: message.into(),
        }
    }

    /// A transform or child-context rule needed a field the record lacks
    pub fn schema_mismatch(stream: impl Into<String>, field: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            stream: stream.into(),
            field: field.into(),
        }
    }

    pub fn pagination(message: impl Into<String>) -> Self {
        Self::Pagination {
            message: message.into(),
        }
    }

    /// A path placeholder or injected field is absent from the partition context
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }
}

/// Statuses the HTTP client retries before handing the response back
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(
        status,
        429 | 500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524
    )
}

/// Result type alias for tap-woo
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner: Error = e.into();
            Error::Other(format!("{}: {inner}", message.into()))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner: Error = e.into();
            Error::Other(format!("{}: {inner}", f()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("consumer_key");
        assert_eq!(
            err.to_string(),
            "Missing required config field: consumer_key"
        );

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");

        let err = Error::schema_mismatch("subscription_orders", "id");
        assert_eq!(
            err.to_string(),
            "Record in stream 'subscription_orders' is missing field 'id'"
        );

        let err = Error::undefined_var("order_id");
        assert_eq!(err.to_string(), "Partition has no value for 'order_id'");
    }

    #[test_case(429, true ; "too many requests")]
    #[test_case(500, true ; "internal error")]
    #[test_case(503, true ; "unavailable")]
    #[test_case(522, true ; "cloudflare timeout")]
    #[test_case(400, false ; "bad request")]
    #[test_case(401, false ; "unauthorized")]
    #[test_case(404, false ; "not found")]
    fn test_retryable_status(status: u16, expected: bool) {
        assert_eq!(is_retryable_status(status), expected);
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
