//! Static stream definitions and record transforms

use crate::error::{Error, Result};
use crate::pagination::PaginationConfig;
use crate::partition::{ParentRouter, PartitionContext};
use crate::schema::JsonSchema;
use crate::types::{JsonObject, JsonValue, ReplicationMethod};

/// Post-processing step applied to every record of a stream, in order
#[derive(Debug, Clone, PartialEq)]
pub enum RecordTransform {
    /// Move a field to a new name; the source field must be present
    RenameField { from: String, to: String },

    /// Copy a partition context value into the record
    InjectFromContext { context_key: String, field: String },

    /// Remove date-time fields holding an empty string
    DropEmptyDates,
}

impl RecordTransform {
    /// Rename `from` to `to`
    pub fn rename(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::RenameField {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Inject the context value `context_key` as `field`
    pub fn inject(context_key: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InjectFromContext {
            context_key: context_key.into(),
            field: field.into(),
        }
    }

    /// Apply the transform to one record
    pub fn apply(
        &self,
        definition: &StreamDefinition,
        mut record: JsonObject,
        context: &PartitionContext,
    ) -> Result<JsonObject> {
        match self {
            Self::RenameField { from, to } => {
                let value = record
                    .remove(from)
                    .ok_or_else(|| Error::schema_mismatch(&definition.name, from))?;
                record.insert(to.clone(), value);
            }
            Self::InjectFromContext { context_key, field } => {
                let value = context
                    .get(context_key)
                    .ok_or_else(|| Error::undefined_var(context_key.clone()))?;
                record.insert(field.clone(), value.clone());
            }
            Self::DropEmptyDates => {
                for field in definition.schema.date_time_fields() {
                    if matches!(record.get(field), Some(JsonValue::String(s)) if s.trim().is_empty()) {
                        record.remove(field);
                    }
                }
            }
        }
        Ok(record)
    }
}

/// Identity, shape and relationships of one stream.
///
/// Built once when the registry is created and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct StreamDefinition {
    /// Unique stream name, also the key in persisted state
    pub name: String,
    /// Path template below the API base, e.g. `/orders/{order_id}/refunds`
    pub path: String,
    /// Fields that identify a record within the stream
    pub primary_key: Vec<String>,
    /// High-water-mark field; `None` for full-table streams
    pub replication_key: Option<String>,
    /// Parent stream name
    pub parent: Option<String>,
    /// Declared record schema
    pub schema: JsonSchema,
    /// Dotted path to the record array (top-level array when unset)
    pub records_path: Option<String>,
    /// Post-processing steps
    pub transforms: Vec<RecordTransform>,
    /// Rule deriving child partition contexts from this stream's records
    pub child_context: Option<ParentRouter>,
    /// Pagination override for this stream
    pub pagination: Option<PaginationConfig>,
}

impl StreamDefinition {
    /// Create a full-table, parentless definition
    pub fn new(name: impl Into<String>, path: impl Into<String>, schema: JsonSchema) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            primary_key: vec!["id".to_string()],
            replication_key: None,
            parent: None,
            schema,
            records_path: None,
            transforms: Vec::new(),
            child_context: None,
            pagination: None,
        }
    }

    #[must_use]
    pub fn primary_key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn replication_key(mut self, field: impl Into<String>) -> Self {
        self.replication_key = Some(field.into());
        self
    }

    #[must_use]
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub fn records_path(mut self, path: impl Into<String>) -> Self {
        self.records_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn transform(mut self, transform: RecordTransform) -> Self {
        self.transforms.push(transform);
        self
    }

    #[must_use]
    pub fn child_context(mut self, router: ParentRouter) -> Self {
        self.child_context = Some(router);
        self
    }

    #[must_use]
    pub fn pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Whether the stream resumes from a bookmark
    pub fn is_incremental(&self) -> bool {
        self.replication_key.is_some()
    }

    pub fn replication_method(&self) -> ReplicationMethod {
        if self.is_incremental() {
            ReplicationMethod::Incremental
        } else {
            ReplicationMethod::FullTable
        }
    }
}
