//! Schema tests

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn order_schema() -> JsonSchema {
    JsonSchema::new()
        .property("id", SchemaProperty::integer())
        .property("status", SchemaProperty::string())
        .property("total", SchemaProperty::string())
        .property("date_created_gmt", SchemaProperty::date_time())
        .property("date_modified_gmt", SchemaProperty::date_time())
        .property(
            "billing",
            SchemaProperty::object([
                ("email", SchemaProperty::string()),
                ("phone", SchemaProperty::string()),
            ]),
        )
        .property(
            "line_items",
            SchemaProperty::array(SchemaProperty::object([(
                "product_id",
                SchemaProperty::integer(),
            )])),
        )
}

#[test]
fn test_json_type_matches() {
    assert!(JsonType::Integer.matches(&json!(5)));
    assert!(!JsonType::Integer.matches(&json!(5.5)));
    assert!(JsonType::Number.matches(&json!(5.5)));
    assert!(JsonType::String.matches(&json!("x")));
    assert!(JsonType::Null.matches(&json!(null)));
    assert!(!JsonType::Boolean.matches(&json!("true")));
}

#[test]
fn test_nullable_matches() {
    let t = JsonTypeOrArray::nullable(JsonType::String);
    assert_eq!(t.primary_type(), Some(&JsonType::String));
    assert!(t.matches(&json!(null)));
    assert!(t.matches(&json!("x")));
    assert!(!t.matches(&json!(1)));

    assert!(JsonTypeOrArray::Single(JsonType::Number).matches(&json!(3)));
}

#[test]
fn test_property_builders() {
    let prop = SchemaProperty::date_time();
    assert!(prop.json_type.matches(&json!(null)));
    assert!(prop.is_date_time());

    let prop = SchemaProperty::any_of([JsonType::Integer, JsonType::String]);
    assert!(prop.json_type.matches(&json!(1)));
    assert!(prop.json_type.matches(&json!("1")));
    assert!(prop.json_type.matches(&json!(null)));
}

#[test]
fn test_schema_serializes_as_json_schema() {
    let schema = JsonSchema::new()
        .property("id", SchemaProperty::integer())
        .property("date_modified_gmt", SchemaProperty::date_time());

    assert_eq!(
        serde_json::to_value(&schema).unwrap(),
        json!({
            "type": "object",
            "properties": {
                "id": {"type": ["integer", "null"]},
                "date_modified_gmt": {"type": ["string", "null"], "format": "date-time"}
            }
        })
    );
}

#[test]
fn test_schema_deserialize_roundtrip() {
    let schema = order_schema();
    let parsed: JsonSchema = serde_json::from_value(serde_json::to_value(&schema).unwrap()).unwrap();
    assert_eq!(parsed, schema);
}

#[test]
fn test_conform_drops_undeclared_fields() {
    let schema = order_schema();
    let record = json!({
        "id": 42,
        "status": "completed",
        "_links": {"self": [{"href": "https://shop.example.com"}]},
        "meta_data": []
    });

    let conformed = schema.conform(record.as_object().unwrap().clone());

    assert_eq!(
        serde_json::Value::Object(conformed),
        json!({"id": 42, "status": "completed"})
    );
}

#[test]
fn test_conform_keeps_declared_values_as_sent() {
    let schema = order_schema();
    let record = json!({"id": "42", "status": 7});

    let conformed = schema.conform(record.as_object().unwrap().clone());

    // mismatched types pass through unchanged
    assert_eq!(serde_json::Value::Object(conformed), record);
}

#[test]
fn test_date_time_fields() {
    let schema = order_schema();
    assert_eq!(
        schema.date_time_fields(),
        vec!["date_created_gmt", "date_modified_gmt"]
    );
}

#[test]
fn test_type_mismatches() {
    let schema = order_schema();
    let record = json!({"id": "42", "status": "completed", "total": null, "extra": 1});

    let mismatches = schema.type_mismatches(record.as_object().unwrap());
    assert_eq!(mismatches, vec!["id".to_string()]);
}
