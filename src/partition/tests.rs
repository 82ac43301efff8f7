//! Tests for the partition module

use super::*;
use crate::error::Error;
use pretty_assertions::assert_eq;
use crate::types::JsonObject;
use serde_json::{json, Value};

fn record(value: Value) -> JsonObject {
    value.as_object().cloned().unwrap_or_default()
}

#[test]
fn test_context_with_value_is_ordered() {
    let ctx = PartitionContext::new()
        .with_value("subscription_id", 7)
        .with_value("order_id", 42);

    assert_eq!(ctx.key(), "order_id=42,subscription_id=7");
    assert_eq!(ctx.get("order_id"), Some(&json!(42)));
}

#[test]
fn test_key_escapes_separators() {
    let comma = PartitionContext::new().with_value("a", "x,b=y");
    let split = PartitionContext::new().with_value("a", "x").with_value("b", "y");

    assert_eq!(split.key(), "a=x,b=y");
    assert_eq!(comma.key(), "a=x\\,b\\=y");
    assert_ne!(comma.key(), split.key());

    let slash = PartitionContext::new().with_value("a", "x\\");
    let slash_comma = PartitionContext::new().with_value("a", "x\\,");
    assert_ne!(slash.key(), slash_comma.key());
    assert_eq!(slash.key(), "a=x\\\\");
}

#[test]
fn test_global_context() {
    let ctx = PartitionContext::new();
    assert!(ctx.is_empty());
    assert_eq!(ctx.key(), "");
    assert_eq!(ctx.to_string(), "<global>");
}

#[test]
fn test_context_serde_is_plain_object() {
    let ctx = PartitionContext::new().with_value("order_id", 42);
    let json = serde_json::to_value(&ctx).unwrap();
    assert_eq!(json, json!({"order_id": 42}));

    let restored: PartitionContext = serde_json::from_value(json).unwrap();
    assert_eq!(restored, ctx);
    assert_eq!(restored.key(), "order_id=42");
}

#[test]
fn test_router_derives_child_context() {
    let router = ParentRouter::new("id", "order_id");
    let child = router
        .route("orders", &record(json!({"id": 42, "status": "completed"})), &PartitionContext::new())
        .unwrap()
        .unwrap();

    assert_eq!(child, PartitionContext::new().with_value("order_id", 42));
}

#[test]
fn test_router_appends_to_parent_context() {
    let router = ParentRouter::new("id", "order_id");
    let parent = PartitionContext::new().with_value("customer_id", 3);

    let child = router
        .route("orders", &record(json!({"id": 42})), &parent)
        .unwrap()
        .unwrap();

    assert_eq!(child.key(), "customer_id=3,order_id=42");
}

#[test]
fn test_router_missing_key_is_schema_mismatch() {
    let router = ParentRouter::new("id", "order_id");
    let err = router
        .route("orders", &record(json!({"number": "1001"})), &PartitionContext::new())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::SchemaMismatch { ref stream, ref field } if stream == "orders" && field == "id"
    ));
}

#[test]
fn test_router_filter() {
    let router = ParentRouter::new("id", "product_id").only_when("type", "variable");

    let skipped = router
        .route("products", &record(json!({"id": 1, "type": "simple"})), &PartitionContext::new())
        .unwrap();
    assert!(skipped.is_none());

    let routed = router
        .route("products", &record(json!({"id": 2, "type": "variable"})), &PartitionContext::new())
        .unwrap();
    assert_eq!(routed.unwrap().get("product_id"), Some(&json!(2)));
}
