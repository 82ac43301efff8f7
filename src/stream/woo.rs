//! Built-in WooCommerce streams
//!
//! Schemas follow the WooCommerce REST API v3 resources. Every property is
//! nullable, as the API returns `null` for unset values.

use super::definition::{RecordTransform, StreamDefinition};
use super::registry::Registry;
use super::rest::{RestStream, Stream};
use crate::error::Result;
use crate::pagination::PaginationConfig;
use crate::partition::ParentRouter;
use crate::schema::{JsonSchema, JsonType, SchemaProperty};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Streams synced when the config does not select any
pub const DEFAULT_STREAMS: &[&str] = &[
    "products",
    "orders",
    "refunds",
    "subscriptions",
    "subscription_orders",
];

/// All built-in definitions, parents before children
pub fn definitions() -> Vec<StreamDefinition> {
    vec![
        products(),
        product_variations(),
        orders(),
        refunds(),
        subscriptions(),
        subscription_orders(),
        coupons(),
        customers(),
    ]
}

/// Registry of the built-in streams.
///
/// `overrides` maps stream names to a pagination strategy replacing
/// `default_pagination` for that stream.
pub fn registry(
    default_pagination: &PaginationConfig,
    overrides: &BTreeMap<String, PaginationConfig>,
) -> Result<Registry> {
    let streams = definitions()
        .into_iter()
        .map(|mut definition| {
            if let Some(pagination) = overrides.get(&definition.name) {
                definition.pagination = Some(pagination.clone());
            }
            Arc::new(RestStream::new(definition, default_pagination)) as Arc<dyn Stream>
        })
        .collect();

    Registry::new(streams)
}

// ============================================================================
// Products
// ============================================================================

pub fn products() -> StreamDefinition {
    let schema = JsonSchema::new()
        .property("id", SchemaProperty::integer())
        .property("name", SchemaProperty::string())
        .property("slug", SchemaProperty::string())
        .property("permalink", SchemaProperty::string())
        .property("date_created", SchemaProperty::date_time())
        .property("date_created_gmt", SchemaProperty::date_time())
        .property("date_modified", SchemaProperty::date_time())
        .property("date_modified_gmt", SchemaProperty::date_time())
        .property("date_on_sale_from_gmt", SchemaProperty::date_time())
        .property("date_on_sale_to_gmt", SchemaProperty::date_time())
        .property("type", SchemaProperty::string())
        .property("status", SchemaProperty::string())
        .property("featured", SchemaProperty::boolean())
        .property("catalog_visibility", SchemaProperty::string())
        .property("description", SchemaProperty::string())
        .property("short_description", SchemaProperty::string())
        .property("sku", SchemaProperty::string())
        .property("price", string_or_number())
        .property("regular_price", string_or_number())
        .property("sale_price", string_or_number())
        .property("on_sale", SchemaProperty::boolean())
        .property("purchasable", SchemaProperty::boolean())
        .property("total_sales", string_or_number())
        .property("virtual", SchemaProperty::boolean())
        .property("downloadable", SchemaProperty::boolean())
        .property("tax_status", SchemaProperty::string())
        .property("tax_class", SchemaProperty::string())
        .property("manage_stock", SchemaProperty::boolean())
        .property("stock_quantity", SchemaProperty::number())
        .property("stock_status", SchemaProperty::string())
        .property("low_stock_amount", string_or_number())
        .property("backorders", SchemaProperty::string())
        .property("weight", SchemaProperty::string())
        .property("dimensions", dimensions())
        .property("shipping_class", SchemaProperty::string())
        .property("shipping_class_id", SchemaProperty::integer())
        .property("average_rating", SchemaProperty::string())
        .property("rating_count", SchemaProperty::integer())
        .property("parent_id", SchemaProperty::integer())
        .property("related_ids", SchemaProperty::array(SchemaProperty::integer()))
        .property("upsell_ids", SchemaProperty::array(SchemaProperty::integer()))
        .property("categories", SchemaProperty::array(term()))
        .property("tags", SchemaProperty::array(term()))
        .property(
            "images",
            SchemaProperty::array(SchemaProperty::object([
                ("id", SchemaProperty::integer()),
                ("date_created_gmt", SchemaProperty::date_time()),
                ("date_modified_gmt", SchemaProperty::date_time()),
                ("src", SchemaProperty::string()),
                ("name", SchemaProperty::string()),
                ("alt", SchemaProperty::string()),
            ])),
        )
        .property(
            "attributes",
            SchemaProperty::array(SchemaProperty::object([
                ("id", SchemaProperty::integer()),
                ("name", SchemaProperty::string()),
                ("position", SchemaProperty::integer()),
                ("visible", SchemaProperty::boolean()),
                ("variation", SchemaProperty::boolean()),
                ("options", SchemaProperty::array(SchemaProperty::string())),
            ])),
        )
        .property("variations", SchemaProperty::array(SchemaProperty::integer()))
        .property("grouped_products", SchemaProperty::array(SchemaProperty::integer()))
        .property("menu_order", SchemaProperty::integer())
        .property("meta_data", meta_data());

    StreamDefinition::new("products", "/products", schema)
        .child_context(ParentRouter::new("id", "product_id").only_when("type", "variable"))
}

pub fn product_variations() -> StreamDefinition {
    let schema = JsonSchema::new()
        .property("id", SchemaProperty::integer())
        .property("product_id", SchemaProperty::integer())
        .property("date_created_gmt", SchemaProperty::date_time())
        .property("date_modified_gmt", SchemaProperty::date_time())
        .property("description", SchemaProperty::string())
        .property("permalink", SchemaProperty::string())
        .property("sku", SchemaProperty::string())
        .property("price", string_or_number())
        .property("regular_price", string_or_number())
        .property("sale_price", string_or_number())
        .property("date_on_sale_from_gmt", SchemaProperty::date_time())
        .property("date_on_sale_to_gmt", SchemaProperty::date_time())
        .property("on_sale", SchemaProperty::boolean())
        .property("status", SchemaProperty::string())
        .property("purchasable", SchemaProperty::boolean())
        .property("virtual", SchemaProperty::boolean())
        .property("downloadable", SchemaProperty::boolean())
        .property("tax_status", SchemaProperty::string())
        .property("tax_class", SchemaProperty::string())
        .property("manage_stock", SchemaProperty::boolean())
        .property("stock_quantity", SchemaProperty::number())
        .property("stock_status", SchemaProperty::string())
        .property("backorders", SchemaProperty::string())
        .property("weight", SchemaProperty::string())
        .property("dimensions", dimensions())
        .property("shipping_class", SchemaProperty::string())
        .property("shipping_class_id", SchemaProperty::integer())
        .property(
            "attributes",
            SchemaProperty::array(SchemaProperty::object([
                ("id", SchemaProperty::integer()),
                ("name", SchemaProperty::string()),
                ("option", SchemaProperty::string()),
            ])),
        )
        .property("menu_order", SchemaProperty::integer())
        .property("meta_data", meta_data());

    StreamDefinition::new("product_variations", "/products/{product_id}/variations", schema)
        .parent("products")
        .transform(RecordTransform::inject("product_id", "product_id"))
}

// ============================================================================
// Orders
// ============================================================================

pub fn orders() -> StreamDefinition {
    let schema = order_fields(JsonSchema::new().property("id", SchemaProperty::integer()))
        .property("parent_id", SchemaProperty::integer())
        .property("created_via", SchemaProperty::string())
        .property("version", SchemaProperty::string())
        .property("currency_symbol", SchemaProperty::string())
        .property("customer_ip_address", SchemaProperty::string())
        .property("customer_user_agent", SchemaProperty::string())
        .property("customer_note", SchemaProperty::string())
        .property("transaction_id", SchemaProperty::string())
        .property("date_completed_gmt", SchemaProperty::date_time())
        .property("cart_hash", SchemaProperty::string())
        .property("coupon_lines", coupon_lines())
        .property("refunds", SchemaProperty::array(SchemaProperty::object([
            ("id", SchemaProperty::integer()),
            ("reason", SchemaProperty::string()),
            ("total", SchemaProperty::string()),
        ])));

    StreamDefinition::new("orders", "/orders", schema)
        .replication_key("date_modified_gmt")
        .child_context(ParentRouter::new("id", "order_id"))
}

pub fn refunds() -> StreamDefinition {
    let schema = JsonSchema::new()
        .property("id", SchemaProperty::integer())
        .property("original_order_id", SchemaProperty::integer())
        .property("date_created", SchemaProperty::date_time())
        .property("date_created_gmt", SchemaProperty::date_time())
        .property("amount", SchemaProperty::string())
        .property("reason", SchemaProperty::string())
        .property("refunded_by", SchemaProperty::integer())
        .property("refunded_payment", SchemaProperty::boolean())
        .property("line_items", line_items())
        .property("meta_data", meta_data());

    StreamDefinition::new("refunds", "/orders/{order_id}/refunds", schema)
        .parent("orders")
        .transform(RecordTransform::inject("order_id", "original_order_id"))
}

// ============================================================================
// Subscriptions
// ============================================================================

pub fn subscriptions() -> StreamDefinition {
    let schema = order_fields(JsonSchema::new().property("id", SchemaProperty::integer()))
        .property("parent_id", SchemaProperty::integer())
        .property("billing_period", SchemaProperty::string())
        .property("billing_interval", string_or_number())
        .property("start_date_gmt", SchemaProperty::date_time())
        .property("trial_end_date_gmt", SchemaProperty::date_time())
        .property("next_payment_date_gmt", SchemaProperty::date_time())
        .property("last_payment_date_gmt", SchemaProperty::date_time())
        .property("cancelled_date_gmt", SchemaProperty::date_time())
        .property("end_date_gmt", SchemaProperty::date_time())
        .property("resubscribed_from", SchemaProperty::string())
        .property("resubscribed_subscription", SchemaProperty::string())
        .property("removed_line_items", line_items());

    StreamDefinition::new("subscriptions", "/subscriptions", schema)
        .replication_key("date_modified_gmt")
        .transform(RecordTransform::DropEmptyDates)
        .child_context(ParentRouter::new("id", "subscription_id"))
}

pub fn subscription_orders() -> StreamDefinition {
    let schema = JsonSchema::new()
        .property("order_id", SchemaProperty::integer())
        .property("subscription_id", SchemaProperty::integer())
        .property("number", SchemaProperty::string())
        .property("status", SchemaProperty::string())
        .property("currency", SchemaProperty::string())
        .property("total", SchemaProperty::string())
        .property("customer_id", SchemaProperty::integer())
        .property("payment_method", SchemaProperty::string())
        .property("date_created_gmt", SchemaProperty::date_time())
        .property("date_modified_gmt", SchemaProperty::date_time())
        .property("date_paid_gmt", SchemaProperty::date_time());

    StreamDefinition::new("subscription_orders", "/subscriptions/{subscription_id}/orders", schema)
        .parent("subscriptions")
        .primary_key(["subscription_id", "order_id"])
        .transform(RecordTransform::rename("id", "order_id"))
        .transform(RecordTransform::inject("subscription_id", "subscription_id"))
}

// ============================================================================
// Coupons / Customers
// ============================================================================

pub fn coupons() -> StreamDefinition {
    let schema = JsonSchema::new()
        .property("id", SchemaProperty::integer())
        .property("code", SchemaProperty::string())
        .property("amount", SchemaProperty::string())
        .property("date_created_gmt", SchemaProperty::date_time())
        .property("date_modified_gmt", SchemaProperty::date_time())
        .property("discount_type", SchemaProperty::string())
        .property("description", SchemaProperty::string())
        .property("date_expires_gmt", SchemaProperty::date_time())
        .property("usage_count", SchemaProperty::integer())
        .property("individual_use", SchemaProperty::boolean())
        .property("product_ids", SchemaProperty::array(SchemaProperty::integer()))
        .property("excluded_product_ids", SchemaProperty::array(SchemaProperty::integer()))
        .property("usage_limit", SchemaProperty::integer())
        .property("usage_limit_per_user", SchemaProperty::integer())
        .property("limit_usage_to_x_items", SchemaProperty::integer())
        .property("free_shipping", SchemaProperty::boolean())
        .property("product_categories", SchemaProperty::array(SchemaProperty::integer()))
        .property("excluded_product_categories", SchemaProperty::array(SchemaProperty::integer()))
        .property("exclude_sale_items", SchemaProperty::boolean())
        .property("minimum_amount", SchemaProperty::string())
        .property("maximum_amount", SchemaProperty::string())
        .property("email_restrictions", SchemaProperty::array(SchemaProperty::string()))
        .property("used_by", SchemaProperty::array(SchemaProperty::string()))
        .property("meta_data", meta_data());

    StreamDefinition::new("coupons", "/coupons", schema).replication_key("date_modified_gmt")
}

pub fn customers() -> StreamDefinition {
    let schema = JsonSchema::new()
        .property("id", SchemaProperty::integer())
        .property("date_created_gmt", SchemaProperty::date_time())
        .property("date_modified_gmt", SchemaProperty::date_time())
        .property("email", SchemaProperty::string())
        .property("first_name", SchemaProperty::string())
        .property("last_name", SchemaProperty::string())
        .property("role", SchemaProperty::string())
        .property("username", SchemaProperty::string())
        .property("billing", billing())
        .property("shipping", shipping())
        .property("is_paying_customer", SchemaProperty::boolean())
        .property("avatar_url", SchemaProperty::string())
        .property("meta_data", meta_data());

    StreamDefinition::new("customers", "/customers", schema)
}

// ============================================================================
// Shared fields
// ============================================================================

/// Fields orders and subscriptions have in common
fn order_fields(schema: JsonSchema) -> JsonSchema {
    schema
        .property("number", SchemaProperty::string())
        .property("order_key", SchemaProperty::string())
        .property("status", SchemaProperty::string())
        .property("currency", SchemaProperty::string())
        .property("date_created", SchemaProperty::date_time())
        .property("date_created_gmt", SchemaProperty::date_time())
        .property("date_modified", SchemaProperty::date_time())
        .property("date_modified_gmt", SchemaProperty::date_time())
        .property("date_paid_gmt", SchemaProperty::date_time())
        .property("discount_total", SchemaProperty::string())
        .property("discount_tax", SchemaProperty::string())
        .property("shipping_total", SchemaProperty::string())
        .property("shipping_tax", SchemaProperty::string())
        .property("cart_tax", SchemaProperty::string())
        .property("total", SchemaProperty::string())
        .property("total_tax", SchemaProperty::string())
        .property("prices_include_tax", SchemaProperty::boolean())
        .property("customer_id", SchemaProperty::integer())
        .property("billing", billing())
        .property("shipping", shipping())
        .property("payment_method", SchemaProperty::string())
        .property("payment_method_title", SchemaProperty::string())
        .property("line_items", line_items())
        .property("tax_lines", SchemaProperty::array(tax_line()))
        .property(
            "shipping_lines",
            SchemaProperty::array(SchemaProperty::object([
                ("id", SchemaProperty::integer()),
                ("method_title", SchemaProperty::string()),
                ("method_id", SchemaProperty::string()),
                ("total", SchemaProperty::string()),
                ("total_tax", SchemaProperty::string()),
                ("taxes", SchemaProperty::array(tax_line())),
            ])),
        )
        .property(
            "fee_lines",
            SchemaProperty::array(SchemaProperty::object([
                ("id", SchemaProperty::integer()),
                ("name", SchemaProperty::string()),
                ("tax_class", SchemaProperty::string()),
                ("tax_status", SchemaProperty::string()),
                ("total", SchemaProperty::string()),
                ("total_tax", SchemaProperty::string()),
                ("taxes", SchemaProperty::array(tax_line())),
            ])),
        )
        .property("meta_data", meta_data())
}

fn string_or_number() -> SchemaProperty {
    SchemaProperty::any_of([JsonType::String, JsonType::Number])
}

fn meta_data() -> SchemaProperty {
    SchemaProperty::array(SchemaProperty::object([
        ("id", SchemaProperty::integer()),
        ("key", SchemaProperty::string()),
        (
            "value",
            SchemaProperty::any_of([JsonType::String, JsonType::Number, JsonType::Boolean, JsonType::Object, JsonType::Array]),
        ),
    ]))
}

fn address() -> Vec<(&'static str, SchemaProperty)> {
    vec![
        ("first_name", SchemaProperty::string()),
        ("last_name", SchemaProperty::string()),
        ("company", SchemaProperty::string()),
        ("address_1", SchemaProperty::string()),
        ("address_2", SchemaProperty::string()),
        ("city", SchemaProperty::string()),
        ("state", SchemaProperty::string()),
        ("postcode", SchemaProperty::string()),
        ("country", SchemaProperty::string()),
    ]
}

fn billing() -> SchemaProperty {
    let mut fields = address();
    fields.push(("email", SchemaProperty::string()));
    fields.push(("phone", SchemaProperty::string()));
    SchemaProperty::object(fields)
}

fn shipping() -> SchemaProperty {
    SchemaProperty::object(address())
}

fn dimensions() -> SchemaProperty {
    SchemaProperty::object([
        ("length", SchemaProperty::string()),
        ("width", SchemaProperty::string()),
        ("height", SchemaProperty::string()),
    ])
}

fn term() -> SchemaProperty {
    SchemaProperty::object([
        ("id", SchemaProperty::integer()),
        ("name", SchemaProperty::string()),
        ("slug", SchemaProperty::string()),
    ])
}

fn tax_line() -> SchemaProperty {
    SchemaProperty::object([
        ("id", SchemaProperty::any_of([JsonType::Integer, JsonType::String])),
        ("rate_code", SchemaProperty::string()),
        ("rate_id", SchemaProperty::integer()),
        ("label", SchemaProperty::string()),
        ("compound", SchemaProperty::boolean()),
        ("tax_total", SchemaProperty::string()),
        ("shipping_tax_total", SchemaProperty::string()),
    ])
}

fn line_items() -> SchemaProperty {
    SchemaProperty::array(SchemaProperty::object([
        ("id", SchemaProperty::integer()),
        ("name", SchemaProperty::string()),
        ("product_id", SchemaProperty::integer()),
        ("variation_id", SchemaProperty::integer()),
        ("quantity", SchemaProperty::number()),
        ("tax_class", SchemaProperty::string()),
        ("subtotal", SchemaProperty::string()),
        ("subtotal_tax", SchemaProperty::string()),
        ("total", SchemaProperty::string()),
        ("total_tax", SchemaProperty::string()),
        ("taxes", SchemaProperty::array(tax_line())),
        ("meta_data", meta_data()),
        ("sku", SchemaProperty::any_of([JsonType::Boolean, JsonType::String])),
        ("price", SchemaProperty::number()),
    ]))
}

fn coupon_lines() -> SchemaProperty {
    SchemaProperty::array(SchemaProperty::object([
        ("id", SchemaProperty::integer()),
        ("code", SchemaProperty::string()),
        ("discount", string_or_number()),
        ("discount_tax", SchemaProperty::string()),
    ]))
}
