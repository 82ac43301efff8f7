//! Tests for streams, the registry and the built-in definitions

use super::*;
use crate::error::Error;
use crate::http::PageResponse;
use crate::pagination::{PageToken, PaginationConfig};
use crate::partition::{ParentRouter, PartitionContext};
use crate::schema::{JsonSchema, SchemaProperty};
use crate::types::{JsonObject, ReplicationMethod};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use reqwest::header::HeaderMap;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use test_case::test_case;

fn record(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn orders_schema() -> JsonSchema {
    JsonSchema::new()
        .property("id", SchemaProperty::integer())
        .property("status", SchemaProperty::string())
        .property("date_modified_gmt", SchemaProperty::date_time())
}

fn orders_stream() -> RestStream {
    RestStream::new(
        StreamDefinition::new("orders", "/orders", orders_schema())
            .replication_key("date_modified_gmt")
            .child_context(ParentRouter::new("id", "order_id")),
        &PaginationConfig::default(),
    )
}

fn refunds_stream() -> RestStream {
    RestStream::new(
        StreamDefinition::new("refunds", "/orders/{order_id}/refunds", JsonSchema::new())
            .parent("orders"),
        &PaginationConfig::default(),
    )
}

fn stream(definition: StreamDefinition) -> Arc<dyn Stream> {
    Arc::new(RestStream::new(definition, &PaginationConfig::default()))
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

// ============================================================================
// RecordTransform Tests
// ============================================================================

#[test]
fn test_rename_field() {
    let def = StreamDefinition::new("subscription_orders", "/x", JsonSchema::new());
    let out = RecordTransform::rename("id", "order_id")
        .apply(&def, record(json!({"id": 7, "total": "1.00"})), &PartitionContext::new())
        .unwrap();

    assert_eq!(out, record(json!({"order_id": 7, "total": "1.00"})));
}

#[test]
fn test_rename_missing_field_is_schema_mismatch() {
    let def = StreamDefinition::new("subscription_orders", "/x", JsonSchema::new());
    let err = RecordTransform::rename("id", "order_id")
        .apply(&def, record(json!({"total": "1.00"})), &PartitionContext::new())
        .unwrap_err();

    assert!(matches!(err, Error::SchemaMismatch { .. }));
}

#[test]
fn test_inject_from_context() {
    let def = StreamDefinition::new("refunds", "/x", JsonSchema::new());
    let ctx = PartitionContext::new().with_value("order_id", 42);

    let out = RecordTransform::inject("order_id", "original_order_id")
        .apply(&def, record(json!({"id": 1})), &ctx)
        .unwrap();
    assert_eq!(out.get("original_order_id"), Some(&json!(42)));

    let err = RecordTransform::inject("order_id", "original_order_id")
        .apply(&def, record(json!({"id": 1})), &PartitionContext::new())
        .unwrap_err();
    assert!(matches!(err, Error::UndefinedVariable { .. }));
}

#[test]
fn test_drop_empty_dates() {
    let schema = JsonSchema::new()
        .property("next_payment_date_gmt", SchemaProperty::date_time())
        .property("end_date_gmt", SchemaProperty::date_time())
        .property("note", SchemaProperty::string());
    let def = StreamDefinition::new("subscriptions", "/subscriptions", schema);

    let out = RecordTransform::DropEmptyDates
        .apply(
            &def,
            record(json!({
                "next_payment_date_gmt": "",
                "end_date_gmt": "2024-01-01T00:00:00",
                "note": ""
            })),
            &PartitionContext::new(),
        )
        .unwrap();

    assert_eq!(
        out,
        record(json!({"end_date_gmt": "2024-01-01T00:00:00", "note": ""}))
    );
}

#[test]
fn test_post_process_applies_transforms_in_order() {
    let s = RestStream::new(
        StreamDefinition::new("subscription_orders", "/s/{subscription_id}/orders", JsonSchema::new())
            .transform(RecordTransform::rename("id", "order_id"))
            .transform(RecordTransform::inject("subscription_id", "subscription_id")),
        &PaginationConfig::default(),
    );
    let ctx = PartitionContext::new().with_value("subscription_id", 5);

    let out = s.post_process(record(json!({"id": 9})), &ctx).unwrap();
    assert_eq!(out, record(json!({"order_id": 9, "subscription_id": 5})));
}

// ============================================================================
// Query Parameter Tests
// ============================================================================

#[test]
fn test_first_page_has_no_page_param() {
    let p = orders_stream()
        .build_query_params(None, Some("2024-01-01T00:00:00Z"), &QueryOptions::default())
        .unwrap();

    assert_eq!(
        p,
        params(&[
            ("per_page", "100"),
            ("order", "asc"),
            ("modified_after", "2024-01-01T00:00:00Z"),
        ])
    );
}

#[test]
fn test_page_token_becomes_page_param() {
    let options = QueryOptions {
        per_page: 10,
        end_date: None,
    };
    let p = orders_stream()
        .build_query_params(Some(&PageToken::Page(2)), None, &options)
        .unwrap();

    assert_eq!(p, params(&[("per_page", "10"), ("order", "asc"), ("page", "2")]));
}

#[test]
fn test_url_token_contributes_page_only() {
    let url = url::Url::parse("https://shop.test/wp-json/wc/v3/orders?per_page=100&page=3").unwrap();
    let p = orders_stream()
        .build_query_params(Some(&PageToken::Url(url)), None, &QueryOptions::default())
        .unwrap();

    assert_eq!(p.last(), Some(&("page".to_string(), "3".to_string())));
}

#[test]
fn test_url_token_without_page_is_error() {
    let url = url::Url::parse("https://shop.test/wp-json/wc/v3/orders?cursor=abc").unwrap();
    let err = orders_stream()
        .build_query_params(Some(&PageToken::Url(url)), None, &QueryOptions::default())
        .unwrap_err();

    assert!(matches!(err, Error::Pagination { .. }));
}

#[test_case("2024-03-01T10:20:30" , "2024-03-01T10:20:30Z" ; "naive bookmark")]
#[test_case("2024-03-01T10:20:30+02:00" , "2024-03-01T08:20:30Z" ; "offset start date")]
#[test_case("2024-03-01" , "2024-03-01T00:00:00Z" ; "date only")]
#[test_case("last-tuesday" , "last-tuesday" ; "unparseable passed through")]
fn test_modified_after_format(starting: &str, expected: &str) {
    let p = orders_stream()
        .build_query_params(None, Some(starting), &QueryOptions::default())
        .unwrap();

    let sent = p.iter().find(|(k, _)| k == "modified_after").map(|(_, v)| v.as_str());
    assert_eq!(sent, Some(expected));
}

#[test]
fn test_full_table_stream_sends_no_date_filters() {
    let options = QueryOptions {
        per_page: 100,
        end_date: Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
    };
    let p = refunds_stream()
        .build_query_params(None, Some("2024-01-01T00:00:00Z"), &options)
        .unwrap();

    assert_eq!(p, params(&[("per_page", "100"), ("order", "asc")]));
}

#[test]
fn test_end_date_sent_as_modified_before() {
    let options = QueryOptions {
        per_page: 100,
        end_date: Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()),
    };
    let p = orders_stream()
        .build_query_params(Some(&PageToken::Page(4)), Some("2024-01-01"), &options)
        .unwrap();

    assert_eq!(
        p,
        params(&[
            ("per_page", "100"),
            ("order", "asc"),
            ("modified_after", "2024-01-01T00:00:00Z"),
            ("modified_before", "2024-06-01T12:00:00Z"),
            ("page", "4"),
        ])
    );
}

// ============================================================================
// Path / Records / Child Context Tests
// ============================================================================

#[test]
fn test_request_path_binds_context() {
    let ctx = PartitionContext::new().with_value("order_id", 42);
    assert_eq!(refunds_stream().request_path(&ctx).unwrap(), "/orders/42/refunds");
    assert_eq!(orders_stream().request_path(&PartitionContext::new()).unwrap(), "/orders");
}

#[test]
fn test_request_path_missing_context_value() {
    let err = refunds_stream().request_path(&PartitionContext::new()).unwrap_err();
    assert!(matches!(err, Error::UndefinedVariable { .. }));
}

#[test]
fn test_parse_records() {
    let response = PageResponse::new(200, HeaderMap::new(), r#"[{"id": 1}, {"id": 2}]"#);
    let records = orders_stream().parse_records(&response).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].get("id"), Some(&json!(2)));
}

#[test]
fn test_child_context() {
    let parent = orders_stream();
    let ctx = parent
        .child_context(&record(json!({"id": 42, "status": "done"})), &PartitionContext::new())
        .unwrap();
    assert_eq!(ctx, Some(PartitionContext::new().with_value("order_id", 42)));

    assert_eq!(
        refunds_stream()
            .child_context(&record(json!({"id": 1})), &PartitionContext::new())
            .unwrap(),
        None
    );
}

#[test]
fn test_stream_pagination_override() {
    let s = RestStream::new(
        StreamDefinition::new("orders", "/orders", JsonSchema::new())
            .pagination(PaginationConfig::link_header()),
        &PaginationConfig::default(),
    );
    assert_eq!(s.pagination(), &PaginationConfig::link_header());
    assert_eq!(s.paginator().name(), "link_header");
    assert_eq!(orders_stream().paginator().name(), "counted");
}

#[test]
fn test_replication_method() {
    assert_eq!(
        orders_stream().definition().replication_method(),
        ReplicationMethod::Incremental
    );
    assert_eq!(
        refunds_stream().definition().replication_method(),
        ReplicationMethod::FullTable
    );
}

// ============================================================================
// Registry Tests
// ============================================================================

fn registry() -> Registry {
    Registry::new(vec![
        Arc::new(orders_stream()),
        Arc::new(refunds_stream()),
        stream(StreamDefinition::new("coupons", "/coupons", JsonSchema::new())),
        stream(StreamDefinition::new("refund_notes", "/orders/{order_id}/refunds/{refund_id}/notes", JsonSchema::new()).parent("refunds")),
    ])
    .unwrap()
}

#[test]
fn test_registry_rejects_duplicate_names() {
    let err = Registry::new(vec![Arc::new(orders_stream()), Arc::new(orders_stream())]).unwrap_err();
    assert!(matches!(err, Error::Registry { .. }));
}

#[test]
fn test_registry_rejects_self_parent() {
    let err = Registry::new(vec![stream(
        StreamDefinition::new("orders", "/orders", JsonSchema::new()).parent("orders"),
    )])
    .unwrap_err();
    assert!(matches!(err, Error::Registry { .. }));
}

#[test_case(&["refunds"] ; "unknown parent")]
#[test_case(&["refunds", "orders"] ; "parent declared after child")]
fn test_registry_rejects_unresolved_parent(order: &[&str]) {
    let streams: Vec<Arc<dyn Stream>> = order
        .iter()
        .map(|name| match *name {
            "orders" => Arc::new(orders_stream()) as Arc<dyn Stream>,
            _ => Arc::new(refunds_stream()) as Arc<dyn Stream>,
        })
        .collect();

    assert!(matches!(Registry::new(streams), Err(Error::Registry { .. })));
}

#[test]
fn test_registry_lookup() {
    let registry = registry();
    assert_eq!(registry.names(), vec!["orders", "refunds", "coupons", "refund_notes"]);
    assert!(registry.get("refunds").is_some());
    assert!(matches!(
        registry.require("nope"),
        Err(Error::StreamNotFound { .. })
    ));
    assert_eq!(registry.ancestors("refund_notes"), vec!["refunds", "orders"]);
    assert!(registry.ancestors("orders").is_empty());
}

#[test]
fn test_sync_order_visits_descendants_after_root() {
    let order: Vec<String> = registry()
        .sync_order()
        .iter()
        .map(|s| s.name().to_string())
        .collect();

    assert_eq!(order, vec!["orders", "refunds", "refund_notes", "coupons"]);
}

#[test]
fn test_select_child_walks_ancestors() {
    let selection = registry().select(&["refund_notes"]).unwrap();

    assert!(selection.is_selected("refund_notes"));
    assert!(!selection.is_selected("orders"));
    assert!(!selection.is_selected("refunds"));
    assert!(selection.is_walked("orders"));
    assert!(selection.is_walked("refunds"));
    assert!(!selection.is_walked("coupons"));
}

#[test]
fn test_select_unknown_stream() {
    assert!(matches!(
        registry().select(&["orders", "invoices"]),
        Err(Error::StreamNotFound { .. })
    ));
}

#[test]
fn test_select_all() {
    let selection = registry().select_all();
    assert_eq!(
        selection.selected().collect::<Vec<_>>(),
        vec!["coupons", "orders", "refund_notes", "refunds"]
    );
    assert!(!selection.is_empty());
    assert!(Selection::default().is_empty());
}

// ============================================================================
// Catalog Tests
// ============================================================================

#[test]
fn test_catalog_from_registry() {
    let registry = registry();
    let selection = registry.select(&["refunds"]).unwrap();
    let catalog = Catalog::from_registry(&registry, &selection);

    assert_eq!(catalog.streams.len(), 4);
    assert_eq!(catalog.streams[0].stream, "orders");

    let orders = catalog.get("orders").unwrap();
    assert!(!orders.selected);
    assert_eq!(orders.replication_key.as_deref(), Some("date_modified_gmt"));
    assert_eq!(orders.replication_method, ReplicationMethod::Incremental);

    let refunds = catalog.get("refunds").unwrap();
    assert!(refunds.selected);
    assert_eq!(refunds.parent_stream.as_deref(), Some("orders"));
    assert_eq!(refunds.key_properties, vec!["id"]);

    let json = serde_json::to_value(&catalog).unwrap();
    assert_eq!(json["streams"][0]["replication_method"], "INCREMENTAL");
    assert_eq!(json["streams"][0]["schema"]["type"], "object");
    assert!(json["streams"][2].get("replication_key").is_none());
}

// ============================================================================
// Built-in Streams
// ============================================================================

#[test]
fn test_builtin_registry() {
    let registry = woo::registry(&PaginationConfig::default(), &BTreeMap::new()).unwrap();

    for name in woo::DEFAULT_STREAMS {
        assert!(registry.get(name).is_some(), "missing {name}");
    }
    assert_eq!(registry.ancestors("refunds"), vec!["orders"]);
    assert_eq!(registry.ancestors("product_variations"), vec!["products"]);
    assert_eq!(registry.ancestors("subscription_orders"), vec!["subscriptions"]);
}

#[test]
fn test_builtin_replication() {
    let registry = woo::registry(&PaginationConfig::default(), &BTreeMap::new()).unwrap();

    for name in ["orders", "coupons", "subscriptions"] {
        let def = registry.get(name).unwrap().definition();
        assert_eq!(def.replication_key.as_deref(), Some("date_modified_gmt"), "{name}");
        assert!(def.schema.get_property("date_modified_gmt").unwrap().is_date_time());
    }
    for name in ["products", "customers", "refunds", "subscription_orders"] {
        assert!(!registry.get(name).unwrap().definition().is_incremental(), "{name}");
    }
}

#[test]
fn test_builtin_pagination_override() {
    let mut overrides = BTreeMap::new();
    overrides.insert("orders".to_string(), PaginationConfig::simple_header());
    let registry = woo::registry(&PaginationConfig::counted(), &overrides).unwrap();

    assert_eq!(registry.get("orders").unwrap().paginator().name(), "simple_header");
    assert_eq!(registry.get("refunds").unwrap().paginator().name(), "counted");
}

#[test]
fn test_products_route_only_variable_products() {
    let products = RestStream::new(woo::products(), &PaginationConfig::default());
    let ctx = PartitionContext::new();

    let simple = products
        .child_context(&record(json!({"id": 1, "type": "simple"})), &ctx)
        .unwrap();
    assert_eq!(simple, None);

    let variable = products
        .child_context(&record(json!({"id": 2, "type": "variable"})), &ctx)
        .unwrap();
    assert_eq!(variable, Some(PartitionContext::new().with_value("product_id", 2)));
}

#[test]
fn test_subscription_orders_shape() {
    let s = RestStream::new(woo::subscription_orders(), &PaginationConfig::default());
    let ctx = PartitionContext::new().with_value("subscription_id", 77);

    assert_eq!(s.request_path(&ctx).unwrap(), "/subscriptions/77/orders");
    assert_eq!(s.definition().primary_key, vec!["subscription_id", "order_id"]);

    let out = s
        .post_process(record(json!({"id": 1001, "status": "completed"})), &ctx)
        .unwrap();
    assert_eq!(out.get("order_id"), Some(&json!(1001)));
    assert_eq!(out.get("subscription_id"), Some(&json!(77)));
    assert!(out.get("id").is_none());
}

#[test]
fn test_subscriptions_drop_blank_dates() {
    let s = RestStream::new(woo::subscriptions(), &PaginationConfig::default());
    let out = s
        .post_process(
            record(json!({"id": 3, "end_date_gmt": "", "trial_end_date_gmt": null})),
            &PartitionContext::new(),
        )
        .unwrap();

    assert!(out.get("end_date_gmt").is_none());
    assert!(out.contains_key("trial_end_date_gmt"));
}
