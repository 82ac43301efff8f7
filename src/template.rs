//! Path template binding
//!
//! Stream paths carry `{placeholder}` segments (e.g. `/orders/{order_id}/refunds`)
//! that are bound from the partition context of the current sync partition.

use crate::error::{Error, Result};
use crate::partition::PartitionContext;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Regex for matching placeholders: {name}
static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*\}").expect("placeholder regex is valid")
});

/// Bind a path template with the given partition context
pub fn render(template: &str, ctx: &PartitionContext) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = PLACEHOLDER_REGEX.replace_all(template, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match ctx.get(name) {
            Some(value) if !value.is_null() => value_to_string(value),
            _ => {
                missing.push(name.to_string());
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Check if a string contains placeholders
pub fn has_placeholders(s: &str) -> bool {
    PLACEHOLDER_REGEX.is_match(s)
}

/// Extract all placeholder names from a template, in order of appearance
pub fn placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Convert a JSON value to a string for substitution
pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_numeric_placeholder() {
        let ctx = PartitionContext::new().with_value("order_id", 42);
        let result = render("/orders/{order_id}/refunds", &ctx).unwrap();
        assert_eq!(result, "/orders/42/refunds");
    }

    #[test]
    fn test_render_multiple_placeholders() {
        let ctx = PartitionContext::new()
            .with_value("product_id", 7)
            .with_value("variation_id", json!("12"));
        let result = render("/products/{product_id}/variations/{ variation_id }", &ctx).unwrap();
        assert_eq!(result, "/products/7/variations/12");
    }

    #[test]
    fn test_render_without_placeholders() {
        let result = render("/orders", &PartitionContext::new()).unwrap();
        assert_eq!(result, "/orders");
    }

    #[test]
    fn test_render_missing_variable() {
        let err = render("/orders/{order_id}/refunds", &PartitionContext::new()).unwrap_err();
        assert!(matches!(err, Error::UndefinedVariable { ref variable } if variable == "order_id"));
    }

    #[test]
    fn test_render_null_is_missing() {
        let ctx = PartitionContext::new().with_value("order_id", Value::Null);
        assert!(render("/orders/{order_id}", &ctx).is_err());
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            placeholders("/subscriptions/{subscription_id}/orders"),
            vec!["subscription_id".to_string()]
        );
        assert!(placeholders("/orders").is_empty());
        assert!(has_placeholders("/orders/{order_id}/refunds"));
        assert!(!has_placeholders("/orders"));
    }
}
