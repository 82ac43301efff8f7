//! Output module
//!
//! Everything a sync produces goes through a [`RecordSink`]:
//! - [`JsonLinesSink`]: Singer-style SCHEMA/RECORD/STATE lines (stdout by default)
//! - [`ParquetSink`]: one Parquet file per stream, Arrow schema derived from
//!   the declared stream schema
//! - [`MemorySink`]: collects messages, used by tests and the `check` command

mod message;
mod schema;
mod writer;

pub use message::{JsonLinesSink, MemorySink, Message, RecordSink};
pub use schema::{arrow_schema, property_type, records_to_batch};
pub use writer::{ParquetSink, ParquetWriter, ParquetWriterConfig};
