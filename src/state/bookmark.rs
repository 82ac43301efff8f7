//! High-water mark tracking
//!
//! Replication values are WooCommerce timestamps. The GMT fields come without
//! an offset (`2024-01-02T03:04:05`), while configured start dates may be
//! RFC 3339 or date-only, so values are compared as instants whenever both
//! sides parse.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::cmp::Ordering;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a timestamp in any of the shapes the API or the config use.
///
/// Values without an offset are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Format an instant for the `modified_after`/`modified_before` parameters
pub fn format_api_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Order two replication values, chronologically when both parse
pub fn compare_replication_values(a: &str, b: &str) -> Ordering {
    match (parse_timestamp(a), parse_timestamp(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// Largest replication value seen in one partition.
///
/// The mark only moves forward: older values are ignored, so records that
/// arrive out of order are still emitted without rewinding the bookmark.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighWaterMark {
    value: Option<String>,
    held: bool,
}

impl HighWaterMark {
    /// Start from a resumed bookmark or start date
    pub fn new(initial: Option<String>) -> Self {
        Self {
            value: initial,
            held: false,
        }
    }

    /// Offer a replication value; returns whether the mark advanced
    pub fn observe(&mut self, candidate: &str) -> bool {
        if self.held {
            return false;
        }
        let advance = match &self.value {
            Some(current) => compare_replication_values(candidate, current) == Ordering::Greater,
            None => true,
        };
        if advance {
            self.value = Some(candidate.to_string());
        }
        advance
    }

    /// Current mark
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Stop advancing; later values are ignored.
    ///
    /// Used once records were skipped, so the mark stays below them. Returns
    /// `true` the first time.
    pub fn hold(&mut self) -> bool {
        !std::mem::replace(&mut self.held, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("2024-01-02T03:04:05" ; "woo gmt")]
    #[test_case("2024-01-02T03:04:05Z" ; "rfc3339 utc")]
    #[test_case("2024-01-02T05:04:05+02:00" ; "rfc3339 offset")]
    #[test_case("2024-01-02 03:04:05" ; "space separated")]
    #[test_case("2024-01-02T03:04:05.000" ; "fractional")]
    fn test_parse_timestamp_shapes(value: &str) {
        let dt = parse_timestamp(value).unwrap();
        assert_eq!(format_api_timestamp(&dt), "2024-01-02T03:04:05Z");
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_timestamp("2024-01-02").unwrap();
        assert_eq!(format_api_timestamp(&dt), "2024-01-02T00:00:00Z");
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_compare_mixed_shapes() {
        assert_eq!(
            compare_replication_values("2024-01-02T03:04:05", "2024-01-02T04:00:00+02:00"),
            Ordering::Greater
        );
        assert_eq!(compare_replication_values("b", "a"), Ordering::Greater);
    }

    #[test]
    fn test_high_water_mark_never_regresses() {
        let mut mark = HighWaterMark::new(Some("2024-01-05T00:00:00".to_string()));

        assert!(!mark.observe("2024-01-01T00:00:00"));
        assert_eq!(mark.value(), Some("2024-01-05T00:00:00"));

        assert!(mark.observe("2024-01-06T00:00:00"));
        assert!(!mark.observe("2024-01-06T00:00:00"));
        assert!(!mark.observe("2024-01-02T00:00:00"));
        assert_eq!(mark.value(), Some("2024-01-06T00:00:00"));
    }

    #[test]
    fn test_held_mark_ignores_later_values() {
        let mut mark = HighWaterMark::new(Some("2024-01-01T00:00:00".to_string()));
        assert!(mark.observe("2024-01-02T00:00:00"));

        assert!(mark.hold());
        assert!(!mark.hold());

        assert!(!mark.observe("2024-01-03T00:00:00"));
        assert_eq!(mark.value(), Some("2024-01-02T00:00:00"));
    }

    #[test]
    fn test_high_water_mark_from_empty() {
        let mut mark = HighWaterMark::default();
        assert!(mark.value().is_none());
        assert!(mark.observe("2024-01-01T00:00:00"));
        assert_eq!(mark.value(), Some("2024-01-01T00:00:00"));
    }

    #[test]
    fn test_high_water_mark_against_date_only_start() {
        let mut mark = HighWaterMark::new(Some("2024-01-01".to_string()));
        assert!(mark.observe("2024-01-01T00:00:01"));
    }
}
