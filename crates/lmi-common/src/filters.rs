//! Catalog filter query-string builder.

use std::fmt::Display;

/// Filter keys the catalog API accepts.
pub const FILTER_WHITELIST: [&str; 6] = [
    "connectorType",
    "provider",
    "status",
    "published",
    "protected",
    "geoInfo",
];

/// Outcome of building a filter fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// `key=value&` fragments for every accepted key, in input order.
    pub query: String,
    /// Keys that are not in the whitelist.
    pub rejected: Vec<String>,
}

/// Build the filter fragment and report rejected keys to the caller.
pub fn parse_filters_report<I, K, V>(filters: I) -> FilterReport
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Display,
{
    let mut report = FilterReport::default();
    for (key, value) in filters {
        let key = key.as_ref();
        if FILTER_WHITELIST.contains(&key) {
            report.query.push_str(&format!("{key}={value}&"));
        } else {
            report.rejected.push(key.to_string());
        }
    }
    report
}

/// Build the `key=value&` fragment for whitelisted filter keys.
///
/// Unknown keys are dropped with a warning.
pub fn parse_filters<I, K, V>(filters: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Display,
{
    let report = parse_filters_report(filters);
    if !report.rejected.is_empty() {
        tracing::warn!(
            keys = %report.rejected.join(", "),
            "Unable to filter by {}.",
            report.rejected.join(", ")
        );
    }
    report.query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelisted_keys_emitted_in_order() {
        let query = parse_filters([("provider", "gee"), ("published", "true")]);
        assert_eq!(query, "provider=gee&published=true&");
    }

    #[test]
    fn test_unknown_keys_dropped() {
        let report = parse_filters_report([("provider", "cartodb"), ("colour", "red")]);
        assert_eq!(report.query, "provider=cartodb&");
        assert_eq!(report.rejected, vec!["colour".to_string()]);
    }

    #[test]
    fn test_empty_input() {
        let empty: Vec<(&str, &str)> = Vec::new();
        assert_eq!(parse_filters(empty), "");
    }
}
