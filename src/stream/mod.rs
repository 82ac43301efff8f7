//! Stream module
//!
//! A stream is one WooCommerce resource type. Its [`StreamDefinition`] is
//! static data; the [`Stream`] trait is the capability surface the sync
//! engine talks to (query building, record parsing, post-processing, child
//! context derivation and pagination).
//!
//! The [`Registry`] holds the ordered set of streams of a run, validates
//! their parent/child relationships and resolves stream selection.

mod catalog;
mod definition;
mod registry;
mod rest;
pub mod woo;

pub use catalog::{Catalog, CatalogEntry};
pub use definition::{RecordTransform, StreamDefinition};
pub use registry::{Registry, Selection};
pub use rest::{QueryOptions, RestStream, Stream};

#[cfg(test)]
mod tests;
