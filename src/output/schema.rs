//! Arrow schema derivation and JSON to Arrow conversion
//!
//! The Arrow schema comes from the declared stream schema, not from the data,
//! so every file of a stream has the same columns whatever the records hold.

use crate::error::{Error, Result};
use crate::schema::{JsonSchema, JsonType, JsonTypeOrArray, SchemaProperty};
use crate::types::{JsonObject, JsonValue};
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, ListArray, NullArray, StringArray,
    StructArray,
};
use arrow::buffer::{NullBuffer, OffsetBuffer};
use arrow::datatypes::{DataType, Field, Fields, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Arrow schema of a stream; every column is nullable
pub fn arrow_schema(schema: &JsonSchema) -> SchemaRef {
    let fields: Vec<Field> = schema
        .properties
        .iter()
        .map(|(name, prop)| Field::new(name, property_type(prop), true))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Arrow type of one schema property.
///
/// Mixed types and free-form objects are kept as JSON text.
pub fn property_type(prop: &SchemaProperty) -> DataType {
    if let JsonTypeOrArray::Multiple(types) = &prop.json_type {
        if types.iter().filter(|t| **t != JsonType::Null).count() > 1 {
            return DataType::Utf8;
        }
    }

    match prop.json_type.primary_type() {
        Some(JsonType::Integer) => DataType::Int64,
        Some(JsonType::Number) => DataType::Float64,
        Some(JsonType::Boolean) => DataType::Boolean,
        Some(JsonType::Null) => DataType::Null,
        Some(JsonType::Object) => match &prop.properties {
            Some(props) if !props.is_empty() => {
                let fields: Vec<Field> = props
                    .iter()
                    .map(|(name, p)| Field::new(name, property_type(p), true))
                    .collect();
                DataType::Struct(Fields::from(fields))
            }
            _ => DataType::Utf8,
        },
        Some(JsonType::Array) => {
            let item = prop.items.as_deref().map_or(DataType::Utf8, property_type);
            DataType::List(Arc::new(Field::new("item", item, true)))
        }
        Some(JsonType::String) | None => DataType::Utf8,
    }
}

/// Convert records to a batch of the given schema.
///
/// Fields missing from a record become nulls; fields the schema does not
/// declare are ignored.
pub fn records_to_batch(schema: &SchemaRef, records: &[JsonObject]) -> Result<RecordBatch> {
    if records.is_empty() {
        return Ok(RecordBatch::new_empty(Arc::clone(schema)));
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        let values: Vec<Option<&JsonValue>> =
            records.iter().map(|record| record.get(field.name())).collect();
        columns.push(build_array(&values, field.data_type())?);
    }

    RecordBatch::try_new(Arc::clone(schema), columns)
        .map_err(|e| Error::output(format!("Failed to create RecordBatch: {e}")))
}

fn present(value: Option<&JsonValue>) -> Option<&JsonValue> {
    value.filter(|v| !v.is_null())
}

/// Build an Arrow array from JSON values
fn build_array(values: &[Option<&JsonValue>], data_type: &DataType) -> Result<ArrayRef> {
    match data_type {
        DataType::Null => Ok(Arc::new(NullArray::new(values.len()))),

        DataType::Boolean => {
            let arr: BooleanArray = values.iter().map(|v| v.and_then(JsonValue::as_bool)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Int64 => {
            let arr: Int64Array = values
                .iter()
                .map(|v| {
                    v.and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::Float64 => {
            let arr: Float64Array = values
                .iter()
                .map(|v| {
                    v.and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::List(field) => build_list_array(values, field),

        DataType::Struct(fields) => build_struct_array(values, fields),

        // Utf8 and anything else: strings verbatim, other values as JSON text
        _ => {
            let arr: StringArray = values
                .iter()
                .map(|v| {
                    present(*v).map(|v| match v {
                        JsonValue::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                })
                .collect();
            Ok(Arc::new(arr))
        }
    }
}

/// Build a list array from JSON arrays
fn build_list_array(values: &[Option<&JsonValue>], field: &Arc<Field>) -> Result<ArrayRef> {
    let mut items: Vec<Option<&JsonValue>> = Vec::new();
    let mut offsets: Vec<i32> = Vec::with_capacity(values.len() + 1);
    let mut validity = Vec::with_capacity(values.len());
    offsets.push(0);

    for value in values {
        match value {
            Some(JsonValue::Array(arr)) => {
                items.extend(arr.iter().map(Some));
                validity.push(true);
            }
            _ => validity.push(false),
        }
        let offset = i32::try_from(items.len())
            .map_err(|_| Error::output("Array too large for i32 offset"))?;
        offsets.push(offset);
    }

    let items_array = build_array(&items, field.data_type())?;
    let list = ListArray::try_new(
        Arc::clone(field),
        OffsetBuffer::new(offsets.into()),
        items_array,
        Some(NullBuffer::from(validity)),
    )?;
    Ok(Arc::new(list))
}

/// Build a struct array from JSON objects
fn build_struct_array(values: &[Option<&JsonValue>], fields: &Fields) -> Result<ArrayRef> {
    let objects: Vec<Option<&JsonObject>> =
        values.iter().map(|v| v.and_then(JsonValue::as_object)).collect();

    let mut children: Vec<ArrayRef> = Vec::with_capacity(fields.len());
    for field in fields {
        let child_values: Vec<Option<&JsonValue>> = objects
            .iter()
            .map(|obj| obj.and_then(|o| o.get(field.name())))
            .collect();
        children.push(build_array(&child_values, field.data_type())?);
    }

    let validity = NullBuffer::from(objects.iter().map(Option::is_some).collect::<Vec<_>>());
    let array = StructArray::try_new(fields.clone(), children, Some(validity))?;
    Ok(Arc::new(array))
}
