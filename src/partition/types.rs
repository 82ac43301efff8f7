//! Partition context type

use crate::template::value_to_string;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Named placeholder values identifying one sync partition.
///
/// Contexts are values: extending a context produces a new one, so a parent
/// partition's context is never changed by its children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionContext {
    values: BTreeMap<String, Value>,
}

impl PartitionContext {
    /// Create the empty (global) context
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of this context with one more value
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Check whether this is the global context
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Canonical partition key used in persisted state (`""` for the global partition).
    ///
    /// Pairs are `k=v` in key order joined by `,`; a `\`, `,` or `=` inside a
    /// name or value is backslash-escaped, so distinct contexts never share a key.
    pub fn key(&self) -> String {
        self.values
            .iter()
            .map(|(k, v)| format!("{}={}", escape_key_part(k), escape_key_part(&value_to_string(v))))
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn escape_key_part(part: &str) -> String {
    let mut escaped = String::with_capacity(part.len());
    for c in part.chars() {
        if matches!(c, '\\' | ',' | '=') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl std::fmt::Display for PartitionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "<global>")
        } else {
            write!(f, "{}", self.key())
        }
    }
}
