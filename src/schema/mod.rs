//! Stream schema module
//!
//! Every stream declares an immutable JSON schema, built once when the
//! registry is created. The schema is emitted in SCHEMA messages, drives the
//! Arrow schema of the Parquet sink, and is used to conform records before
//! they are emitted.

mod types;

pub use types::{JsonSchema, JsonType, JsonTypeOrArray, SchemaProperty};

#[cfg(test)]
mod tests;
