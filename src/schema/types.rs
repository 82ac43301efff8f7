//! Schema types

use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON Schema type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl JsonType {
    /// Check whether a JSON value is an instance of this type
    pub fn matches(&self, value: &JsonValue) -> bool {
        match (self, value) {
            (JsonType::String, JsonValue::String(_))
            | (JsonType::Boolean, JsonValue::Bool(_))
            | (JsonType::Object, JsonValue::Object(_))
            | (JsonType::Array, JsonValue::Array(_))
            | (JsonType::Null, JsonValue::Null)
            | (JsonType::Number, JsonValue::Number(_)) => true,
            (JsonType::Integer, JsonValue::Number(n)) => n.is_i64() || n.is_u64(),
            _ => false,
        }
    }
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonType::String => write!(f, "string"),
            JsonType::Number => write!(f, "number"),
            JsonType::Integer => write!(f, "integer"),
            JsonType::Boolean => write!(f, "boolean"),
            JsonType::Object => write!(f, "object"),
            JsonType::Array => write!(f, "array"),
            JsonType::Null => write!(f, "null"),
        }
    }
}

/// `type` keyword: one type, or a list such as `["string", "null"]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonTypeOrArray {
    Single(JsonType),
    Multiple(Vec<JsonType>),
}

impl JsonTypeOrArray {
    /// Create a nullable type
    pub fn nullable(t: JsonType) -> Self {
        if t == JsonType::Null {
            JsonTypeOrArray::Single(JsonType::Null)
        } else {
            JsonTypeOrArray::Multiple(vec![t, JsonType::Null])
        }
    }

    /// Get the primary (non-null) type
    pub fn primary_type(&self) -> Option<&JsonType> {
        match self {
            JsonTypeOrArray::Single(t) => Some(t),
            JsonTypeOrArray::Multiple(types) => types.iter().find(|t| **t != JsonType::Null),
        }
    }

    /// Check whether a value satisfies any of the listed types.
    ///
    /// Integers are accepted where a number is declared.
    pub fn matches(&self, value: &JsonValue) -> bool {
        let accepts = |t: &JsonType| {
            t.matches(value) || (*t == JsonType::Number && JsonType::Integer.matches(value))
        };
        match self {
            JsonTypeOrArray::Single(t) => accepts(t),
            JsonTypeOrArray::Multiple(types) => types.iter().any(accepts),
        }
    }
}

/// JSON Schema property definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    /// Property type(s)
    #[serde(rename = "type")]
    pub json_type: JsonTypeOrArray,

    /// Format hint (e.g., "date-time", "uri")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Nested properties (for objects)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaProperty>>,

    /// Array items schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaProperty>>,
}

impl SchemaProperty {
    /// A property of exactly one type
    pub fn new(json_type: JsonType) -> Self {
        Self {
            json_type: JsonTypeOrArray::Single(json_type),
            format: None,
            properties: None,
            items: None,
        }
    }

    /// Create a nullable property
    pub fn nullable(json_type: JsonType) -> Self {
        Self {
            json_type: JsonTypeOrArray::nullable(json_type),
            ..Self::new(JsonType::Null)
        }
    }

    /// Nullable integer
    pub fn integer() -> Self {
        Self::nullable(JsonType::Integer)
    }

    /// Nullable number
    pub fn number() -> Self {
        Self::nullable(JsonType::Number)
    }

    /// Nullable string
    pub fn string() -> Self {
        Self::nullable(JsonType::String)
    }

    /// Nullable boolean
    pub fn boolean() -> Self {
        Self::nullable(JsonType::Boolean)
    }

    /// Nullable string with the `date-time` format
    pub fn date_time() -> Self {
        Self::string().with_format("date-time")
    }

    /// A value that may be any of the listed types or null
    pub fn any_of(types: impl IntoIterator<Item = JsonType>) -> Self {
        let mut types: Vec<JsonType> = types.into_iter().collect();
        if !types.contains(&JsonType::Null) {
            types.push(JsonType::Null);
        }
        Self {
            json_type: JsonTypeOrArray::Multiple(types),
            ..Self::new(JsonType::Null)
        }
    }

    /// Create a nullable object property with nested properties
    pub fn object(properties: impl IntoIterator<Item = (&'static str, SchemaProperty)>) -> Self {
        Self {
            json_type: JsonTypeOrArray::nullable(JsonType::Object),
            properties: Some(
                properties
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            ),
            ..Self::new(JsonType::Null)
        }
    }

    /// Create a nullable array property with item schema
    pub fn array(items: SchemaProperty) -> Self {
        Self {
            json_type: JsonTypeOrArray::nullable(JsonType::Array),
            items: Some(Box::new(items)),
            ..Self::new(JsonType::Null)
        }
    }

    /// Set format hint
    #[must_use]
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Check if this is a date-time string
    pub fn is_date_time(&self) -> bool {
        self.format.as_deref() == Some("date-time")
    }
}

/// Full JSON Schema document of a stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema {
    /// Schema type (always "object" for top-level)
    #[serde(rename = "type")]
    pub json_type: JsonType,

    /// Object properties
    #[serde(default)]
    pub properties: BTreeMap<String, SchemaProperty>,
}

impl Default for JsonSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSchema {
    /// Create a new empty schema
    pub fn new() -> Self {
        Self {
            json_type: JsonType::Object,
            properties: BTreeMap::new(),
        }
    }

    /// Add a property, builder style
    #[must_use]
    pub fn property(mut self, name: &str, property: SchemaProperty) -> Self {
        self.properties.insert(name.to_string(), property);
        self
    }

    /// Get a property
    pub fn get_property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.get(name)
    }

    /// Names of the top-level date-time properties
    pub fn date_time_fields(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|(_, p)| p.is_date_time())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Drop top-level fields the schema does not declare
    pub fn conform(&self, mut record: JsonObject) -> JsonObject {
        record.retain(|key, _| self.properties.contains_key(key));
        record
    }

    /// Top-level fields whose value does not match the declared type
    pub fn type_mismatches(&self, record: &JsonObject) -> Vec<String> {
        record
            .iter()
            .filter_map(|(key, value)| {
                let prop = self.properties.get(key)?;
                (!prop.json_type.matches(value)).then(|| key.clone())
            })
            .collect()
    }
}
