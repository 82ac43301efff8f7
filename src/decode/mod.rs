//! Response decoder module
//!
//! WooCommerce collection endpoints answer with a bare JSON array. Proxies
//! and some extensions wrap it in an envelope, which `records_path` unwraps.

mod decoders;

pub use decoders::JsonDecoder;

use crate::error::Result;
use crate::types::JsonObject;

/// Trait for decoding response bodies into records
pub trait RecordDecoder: Send + Sync {
    /// Decode the response body into a list of records
    fn decode(&self, body: &str) -> Result<Vec<JsonObject>>;
}
