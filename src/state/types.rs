//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs.

use crate::partition::PartitionContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete persisted state of the tap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream bookmarks
    #[serde(default)]
    pub bookmarks: BTreeMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.bookmarks.get(stream)
    }

    /// Get mutable state for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamState {
        self.bookmarks.entry(stream.to_string()).or_default()
    }

    /// Replication value persisted for a partition
    pub fn bookmark(&self, stream: &str, context: &PartitionContext) -> Option<&str> {
        let stream_state = self.bookmarks.get(stream)?;
        if context.is_empty() {
            stream_state.replication_key_value.as_deref()
        } else {
            stream_state
                .partitions
                .get(&context.key())?
                .replication_key_value
                .as_deref()
        }
    }

    /// Persist a partition's replication value
    pub fn set_bookmark(
        &mut self,
        stream: &str,
        context: &PartitionContext,
        replication_key: &str,
        value: impl Into<String>,
    ) {
        let stream_state = self.get_stream_mut(stream);
        stream_state.replication_key = Some(replication_key.to_string());

        if context.is_empty() {
            stream_state.replication_key_value = Some(value.into());
        } else {
            stream_state.partitions.insert(
                context.key(),
                PartitionState {
                    context: context.clone(),
                    replication_key_value: Some(value.into()),
                },
            );
        }
    }
}

/// State for a single stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamState {
    /// Name of the replication key field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,

    /// High-water mark of the global partition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key_value: Option<String>,

    /// Per-partition state, keyed by the canonical context key
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub partitions: BTreeMap<String, PartitionState>,
}

/// State for a single partition of a child stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionState {
    /// Context the partition was synced with
    #[serde(default)]
    pub context: PartitionContext,

    /// High-water mark within this partition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key_value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_state_default() {
        let state = State::new();
        assert!(state.bookmarks.is_empty());
        assert!(state.bookmark("orders", &PartitionContext::new()).is_none());
    }

    #[test]
    fn test_global_bookmark() {
        let mut state = State::new();
        let global = PartitionContext::new();

        state.set_bookmark("orders", &global, "date_modified_gmt", "2024-01-02T03:04:05");

        assert_eq!(state.bookmark("orders", &global), Some("2024-01-02T03:04:05"));
        assert_eq!(
            state.get_stream("orders").unwrap().replication_key.as_deref(),
            Some("date_modified_gmt")
        );
    }

    #[test]
    fn test_partition_bookmarks_are_independent() {
        let mut state = State::new();
        let order_1 = PartitionContext::new().with_value("order_id", 1);
        let order_2 = PartitionContext::new().with_value("order_id", 2);

        state.set_bookmark("refunds", &order_1, "date_created_gmt", "2024-01-01T00:00:00");

        assert_eq!(state.bookmark("refunds", &order_1), Some("2024-01-01T00:00:00"));
        assert!(state.bookmark("refunds", &order_2).is_none());
        assert!(state.bookmark("refunds", &PartitionContext::new()).is_none());
    }

    #[test]
    fn test_state_json_layout() {
        let mut state = State::new();
        state.set_bookmark(
            "orders",
            &PartitionContext::new(),
            "date_modified_gmt",
            "2024-01-02T03:04:05",
        );
        state.set_bookmark(
            "refunds",
            &PartitionContext::new().with_value("order_id", 42),
            "date_created_gmt",
            "2024-01-03T00:00:00",
        );

        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({
                "bookmarks": {
                    "orders": {
                        "replication_key": "date_modified_gmt",
                        "replication_key_value": "2024-01-02T03:04:05"
                    },
                    "refunds": {
                        "replication_key": "date_created_gmt",
                        "partitions": {
                            "order_id=42": {
                                "context": {"order_id": 42},
                                "replication_key_value": "2024-01-03T00:00:00"
                            }
                        }
                    }
                }
            })
        );

        let restored: State = serde_json::from_value(serde_json::to_value(&state).unwrap()).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_state_tolerates_unknown_shape() {
        let state: State = serde_json::from_str("{}").unwrap();
        assert!(state.bookmarks.is_empty());
    }
}
