//! Partition module
//!
//! A partition is one sync context of a stream: the whole resource for a
//! parentless stream, or one instance per parent record for a child stream.
//!
//! - `PartitionContext` - ordered placeholder values bound into path templates
//! - `ParentRouter` - derives a child partition context from a parent record

mod routers;
mod types;

pub use routers::ParentRouter;
pub use types::PartitionContext;

#[cfg(test)]
mod tests;
