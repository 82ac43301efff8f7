//! Parent record routing
//!
//! Turns each record of a parent stream into the partition context of a
//! child stream (e.g. an order `{"id": 42}` into `{"order_id": 42}`).

use super::types::PartitionContext;
use crate::error::{Error, Result};
use crate::types::JsonObject;
use serde_json::Value;

/// Derives child partition contexts from parent records
#[derive(Debug, Clone, PartialEq)]
pub struct ParentRouter {
    /// Field to read from the parent record
    pub parent_key: String,
    /// Context key the value is bound to
    pub partition_field: String,
    /// Only route records whose field equals the given value
    pub only_when: Option<(String, Value)>,
}

impl ParentRouter {
    /// Create a new parent router
    pub fn new(parent_key: impl Into<String>, partition_field: impl Into<String>) -> Self {
        Self {
            parent_key: parent_key.into(),
            partition_field: partition_field.into(),
            only_when: None,
        }
    }

    /// Only route parent records where `field == value`
    #[must_use]
    pub fn only_when(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.only_when = Some((field.into(), value.into()));
        self
    }

    /// Derive the child context for one parent record.
    ///
    /// Returns `Ok(None)` when the record is filtered out, and a schema
    /// mismatch when the key field is missing.
    pub fn route(
        &self,
        stream: &str,
        record: &JsonObject,
        parent_context: &PartitionContext,
    ) -> Result<Option<PartitionContext>> {
        if let Some((field, expected)) = &self.only_when {
            if record.get(field) != Some(expected) {
                return Ok(None);
            }
        }

        match record.get(&self.parent_key) {
            Some(value) if !value.is_null() => Ok(Some(
                parent_context
                    .clone()
                    .with_value(self.partition_field.clone(), value.clone()),
            )),
            _ => Err(Error::schema_mismatch(stream, &self.parent_key)),
        }
    }
}
