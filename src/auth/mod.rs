//! Authentication module
//!
//! Supports: HTTP Basic (consumer key/secret), query-string credentials, none
//!
//! WooCommerce issues a consumer key/secret pair per API user. Over TLS the
//! pair is sent as HTTP Basic credentials; stores served over plain HTTP
//! accept them as `consumer_key`/`consumer_secret` query parameters instead.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, AuthMethod};
