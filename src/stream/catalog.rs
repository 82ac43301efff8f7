//! Discovery catalog

use super::registry::{Registry, Selection};
use crate::schema::JsonSchema;
use crate::types::ReplicationMethod;
use serde::{Deserialize, Serialize};

/// Catalog printed by `discover`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub streams: Vec<CatalogEntry>,
}

/// One stream of the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub tap_stream_id: String,
    pub stream: String,
    pub schema: JsonSchema,
    pub key_properties: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,
    pub replication_method: ReplicationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_stream: Option<String>,
    #[serde(default)]
    pub selected: bool,
}

impl Catalog {
    /// Build the catalog of a registry in sync order
    pub fn from_registry(registry: &Registry, selection: &Selection) -> Self {
        let streams = registry
            .sync_order()
            .iter()
            .map(|stream| {
                let def = stream.definition();
                CatalogEntry {
                    tap_stream_id: def.name.clone(),
                    stream: def.name.clone(),
                    schema: def.schema.clone(),
                    key_properties: def.primary_key.clone(),
                    replication_key: def.replication_key.clone(),
                    replication_method: def.replication_method(),
                    parent_stream: def.parent.clone(),
                    selected: selection.is_selected(&def.name),
                }
            })
            .collect();

        Self { streams }
    }

    /// Look up an entry
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.streams.iter().find(|e| e.stream == name)
    }
}
