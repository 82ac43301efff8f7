//! HTTP client module
//!
//! The sync engine only talks to the upstream API through the [`Transport`]
//! trait. [`HttpClient`] is the production implementation.
//!
//! # Features
//!
//! - **Automatic Retries**: timeouts, connection errors, 429 and 5xx responses
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Authentication**: Integration with auth module

mod client;
mod rate_limit;
mod transport;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use transport::{PageRequest, PageResponse, Transport};
