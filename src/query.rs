//! Query descriptor for list operations
//!
//! This module turns raw, untyped request parameters into a normalized,
//! bounded [`ListQuery`]: pagination, sort, projection, the free-text search
//! term, and the raw relation-expansion string.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use crudwire::query::ListQuery;
//!
//! let mut params = HashMap::new();
//! params.insert("page".to_string(), "3".to_string());
//! params.insert("limit".to_string(), "50".to_string());
//!
//! let query = ListQuery::from_params(&params);
//! assert_eq!(query.page(), 3);
//! assert_eq!(query.limit(), 50);
//! assert_eq!(query.skip(), 100);
//! assert_eq!(query.sort(), "-createdAt");
//! ```

use std::collections::HashMap;

/// Default number of items per page
pub const DEFAULT_LIMIT: u32 = 20;

/// Maximum allowed items per page
pub const MAX_LIMIT: u32 = 100;

/// Default sort specification (descending by creation time)
pub const DEFAULT_SORT: &str = "-createdAt";

/// Normalized, bounded query descriptor for list operations
///
/// Constructed once per request from the raw query-string parameters and
/// immutable afterwards. Pagination bounds hold regardless of input:
/// `page` is always ≥ 1 and `limit` always falls in `[1, MAX_LIMIT]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    page: u32,
    limit: u32,
    sort: String,
    select: String,
    search: String,
    include: String,
}

impl ListQuery {
    /// Build a query descriptor from raw string-valued request parameters
    ///
    /// Non-numeric `page`/`limit` values are treated identically to absent
    /// values and fall back to their defaults; out-of-range values are
    /// clamped. This never fails.
    #[must_use]
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let page = parse_number(params.get("page")).unwrap_or(1).max(1);
        let limit = parse_number(params.get("limit"))
            .unwrap_or(i64::from(DEFAULT_LIMIT))
            .clamp(1, i64::from(MAX_LIMIT));

        Self {
            page: page.min(i64::from(u32::MAX)) as u32,
            limit: limit as u32,
            sort: non_empty_or(params.get("sort"), DEFAULT_SORT),
            select: non_empty_or(params.get("select"), ""),
            search: non_empty_or(params.get("q"), ""),
            include: non_empty_or(params.get("include"), ""),
        }
    }

    /// The 1-indexed page number, always ≥ 1
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Items per page, always in `[1, MAX_LIMIT]`
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of records to skip: `(page - 1) * limit`
    #[must_use]
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Opaque sort specification, passed through to the store unvalidated
    #[must_use]
    pub fn sort(&self) -> &str {
        &self.sort
    }

    /// Opaque projection specification; empty means "all fields"
    #[must_use]
    pub fn select(&self) -> &str {
        &self.select
    }

    /// Free-text search term; empty means "no search"
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Raw comma-separated relation-expansion string
    #[must_use]
    pub fn include(&self) -> &str {
        &self.include
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::from_params(&HashMap::new())
    }
}

/// Parse a raw parameter as an integer, treating garbage as absent
fn parse_number(value: Option<&String>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}

fn non_empty_or(value: Option<&String>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.clone(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let query = ListQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), DEFAULT_LIMIT);
        assert_eq!(query.skip(), 0);
        assert_eq!(query.sort(), DEFAULT_SORT);
        assert_eq!(query.select(), "");
        assert_eq!(query.search(), "");
        assert_eq!(query.include(), "");
    }

    #[test]
    fn test_page_parsed() {
        let query = ListQuery::from_params(&params(&[("page", "4")]));
        assert_eq!(query.page(), 4);
    }

    #[test]
    fn test_page_zero_coerced_to_one() {
        let query = ListQuery::from_params(&params(&[("page", "0")]));
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn test_page_negative_coerced_to_one() {
        let query = ListQuery::from_params(&params(&[("page", "-3")]));
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn test_page_non_numeric_falls_back() {
        let query = ListQuery::from_params(&params(&[("page", "abc")]));
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn test_limit_clamped_down() {
        let query = ListQuery::from_params(&params(&[("limit", "500")]));
        assert_eq!(query.limit(), MAX_LIMIT);
    }

    #[test]
    fn test_limit_clamped_up() {
        let query = ListQuery::from_params(&params(&[("limit", "0")]));
        assert_eq!(query.limit(), 1);

        let query = ListQuery::from_params(&params(&[("limit", "-5")]));
        assert_eq!(query.limit(), 1);
    }

    #[test]
    fn test_limit_non_numeric_falls_back() {
        let query = ListQuery::from_params(&params(&[("limit", "lots")]));
        assert_eq!(query.limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn test_skip_calculation() {
        let query = ListQuery::from_params(&params(&[("page", "1"), ("limit", "20")]));
        assert_eq!(query.skip(), 0);

        let query = ListQuery::from_params(&params(&[("page", "2"), ("limit", "20")]));
        assert_eq!(query.skip(), 20);

        let query = ListQuery::from_params(&params(&[("page", "3"), ("limit", "50")]));
        assert_eq!(query.skip(), 100);
    }

    #[test]
    fn test_passthrough_fields() {
        let query = ListQuery::from_params(&params(&[
            ("sort", "name"),
            ("select", "name email"),
            ("q", "bob"),
            ("include", "profile,orders"),
        ]));
        assert_eq!(query.sort(), "name");
        assert_eq!(query.select(), "name email");
        assert_eq!(query.search(), "bob");
        assert_eq!(query.include(), "profile,orders");
    }

    #[test]
    fn test_empty_sort_falls_back_to_default() {
        let query = ListQuery::from_params(&params(&[("sort", "")]));
        assert_eq!(query.sort(), DEFAULT_SORT);
    }
}
