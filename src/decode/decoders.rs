//! Decoder implementations

use super::RecordDecoder;
use crate::error::{Error, Result};
use crate::types::JsonObject;
use serde_json::Value;

// ============================================================================
// JSON Decoder
// ============================================================================

/// JSON decoder with optional record path extraction
#[derive(Debug, Clone, Default)]
pub struct JsonDecoder {
    /// Dotted path to the record array
    records_path: Option<String>,
}

impl JsonDecoder {
    /// Create a decoder for a top-level array
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a JSON decoder with a record path
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            records_path: Some(path.into()),
        }
    }

    /// Create a decoder from an optional path
    pub fn from_path(path: Option<&str>) -> Self {
        Self {
            records_path: path.map(str::to_string),
        }
    }

    fn locate<'a>(&self, value: &'a Value) -> Result<&'a Value> {
        let Some(path) = &self.records_path else {
            return Ok(value);
        };

        extract_simple_path(value, path)
            .ok_or_else(|| Error::extraction(path.clone(), "path not found in response"))
    }
}

impl RecordDecoder for JsonDecoder {
    fn decode(&self, body: &str) -> Result<Vec<JsonObject>> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))?;

        let path = self.records_path.as_deref().unwrap_or("$");
        let Value::Array(items) = self.locate(&value)?.clone() else {
            return Err(Error::extraction(path, "expected an array of records"));
        };

        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => Ok(map),
                other => Err(Error::decode(format!(
                    "record {i} at '{path}' is not an object: {other}"
                ))),
            })
            .collect()
    }
}

/// Walk a dotted path (`data.items`, `$.data.items`, `pages[0].items`)
fn extract_simple_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index = part[bracket_pos + 1..].strip_suffix(']')?.parse::<usize>().ok()?;

            if !name.is_empty() {
                current = current.get(name)?;
            }
            current = current.as_array()?.get(index)?;
        } else {
            current = current.get(part)?;
        }
    }

    Some(current)
}
