//! Tap configuration
//!
//! The tap reads one JSON or YAML file (chosen by extension) describing the
//! store, the credentials and the sync window. Every scalar setting can be
//! overridden by a `TAP_WOO_*` environment variable.

use crate::auth::{AuthConfig, AuthMethod};
use crate::engine::SyncConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::pagination::PaginationConfig;
use crate::state::parse_timestamp;
use crate::stream::{woo, QueryOptions, Registry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Path of the WooCommerce REST API below the store URL
pub const API_PATH: &str = "wp-json/wc/v3";

/// Prefix of the environment overrides
pub const ENV_PREFIX: &str = "TAP_WOO_";

// ============================================================================
// Tap Config
// ============================================================================

/// Complete tap configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapConfig {
    /// Store URL, e.g. `https://shop.example.com`
    #[serde(default)]
    pub api_url: String,

    /// REST API consumer key
    #[serde(default)]
    pub consumer_key: String,

    /// REST API consumer secret
    #[serde(default)]
    pub consumer_secret: String,

    /// Lower bound for incremental streams without a bookmark
    #[serde(default)]
    pub start_date: Option<String>,

    /// Upper bound sent as `modified_before`
    #[serde(default)]
    pub end_date: Option<String>,

    /// Page size
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// How the credentials are sent
    #[serde(default)]
    pub auth_method: AuthMethod,

    /// Pagination strategy for all streams
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Pagination strategy per stream name
    #[serde(default)]
    pub stream_pagination: BTreeMap<String, PaginationConfig>,

    /// Streams to sync; the default set when absent
    #[serde(default)]
    pub streams: Option<Vec<String>>,

    /// Commit bookmarks after every page
    #[serde(default)]
    pub state_per_page: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Request rate limit
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_per_page() -> u32 {
    100
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_rps() -> u32 {
    5
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            consumer_key: String::new(),
            consumer_secret: String::new(),
            start_date: None,
            end_date: None,
            per_page: default_per_page(),
            auth_method: AuthMethod::default(),
            pagination: PaginationConfig::default(),
            stream_pagination: BTreeMap::new(),
            streams: None,
            state_per_page: false,
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            requests_per_second: default_rps(),
            user_agent: None,
        }
    }
}

impl TapConfig {
    /// Load, apply environment overrides and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config {}: {e}", path.display()))
        })?;

        let mut config = if is_yaml(path) {
            Self::from_yaml(&contents)?
        } else {
            Self::from_json(&contents)?
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse JSON without validating
    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Parse YAML without validating
    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Apply `TAP_WOO_*` overrides read through `lookup`
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.is_empty());

        if let Some(v) = var("API_URL") {
            self.api_url = v;
        }
        if let Some(v) = var("CONSUMER_KEY") {
            self.consumer_key = v;
        }
        if let Some(v) = var("CONSUMER_SECRET") {
            self.consumer_secret = v;
        }
        if let Some(v) = var("START_DATE") {
            self.start_date = Some(v);
        }
        if let Some(v) = var("END_DATE") {
            self.end_date = Some(v);
        }
        if let Some(v) = var("PER_PAGE") {
            self.per_page = v
                .trim()
                .parse()
                .map_err(|_| Error::invalid_value("per_page", format!("'{v}' is not a number")))?;
        }
        if let Some(v) = var("STREAMS") {
            self.streams = Some(
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            );
        }
        Ok(())
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(Error::missing_field("api_url"));
        }
        url::Url::parse(&self.base_url())
            .map_err(|e| Error::invalid_value("api_url", e.to_string()))?;

        if self.consumer_key.trim().is_empty() {
            return Err(Error::missing_field("consumer_key"));
        }
        if self.consumer_secret.trim().is_empty() {
            return Err(Error::missing_field("consumer_secret"));
        }

        if !(1..=100).contains(&self.per_page) {
            return Err(Error::invalid_value(
                "per_page",
                format!("{} is outside 1..=100", self.per_page),
            ));
        }

        let start = date_field("start_date", self.start_date.as_deref())?;
        let end = date_field("end_date", self.end_date.as_deref())?;
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(Error::invalid_value("end_date", "end_date is before start_date"));
            }
        }

        Ok(())
    }

    /// API base URL, `{api_url}/wp-json/wc/v3`
    pub fn base_url(&self) -> String {
        let url = self.api_url.trim().trim_end_matches('/');
        if url.ends_with(API_PATH) {
            url.to_string()
        } else {
            format!("{url}/{API_PATH}")
        }
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::from_credentials(self.auth_method, &self.consumer_key, &self.consumer_secret)
    }

    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(self.base_url())
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retries(self.max_retries)
            .rate_limit(RateLimiterConfig::per_second(self.requests_per_second));
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }

    /// Parsed `end_date`
    pub fn end_date_utc(&self) -> Result<Option<DateTime<Utc>>> {
        date_field("end_date", self.end_date.as_deref())
    }

    pub fn sync_config(&self) -> Result<SyncConfig> {
        Ok(SyncConfig {
            query: QueryOptions {
                per_page: self.per_page,
                end_date: self.end_date_utc()?,
            },
            start_date: self.start_date.clone(),
            state_per_page: self.state_per_page,
        })
    }

    /// Configured streams, or the default set
    pub fn selected_streams(&self) -> Vec<String> {
        match &self.streams {
            Some(streams) if !streams.is_empty() => streams.clone(),
            _ => woo::DEFAULT_STREAMS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Registry of the built-in streams with the configured pagination
    pub fn registry(&self) -> Result<Registry> {
        woo::registry(&self.pagination, &self.stream_pagination)
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

fn date_field(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match value {
        None => Ok(None),
        Some(v) => parse_timestamp(v)
            .map(Some)
            .ok_or_else(|| Error::invalid_value(field, format!("'{v}' is not a date"))),
    }
}
