//! Relation-expansion filtering
//!
//! Normalizes the raw comma-separated `include` parameter and intersects it
//! against an optional allow-list. Disallowed relations are silently
//! dropped, never an error.

/// Split a raw relation string into trimmed, non-empty segments
///
/// Order is preserved and duplicates are kept.
///
/// # Example
///
/// ```rust
/// use crudwire::include::normalize_include;
///
/// assert_eq!(
///     normalize_include(" profile, orders ,,profile"),
///     vec!["profile", "orders", "profile"]
/// );
/// assert!(normalize_include("").is_empty());
/// ```
#[must_use]
pub fn normalize_include(include: &str) -> Vec<String> {
    include
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Filter requested relations through an allow-list
///
/// An empty allow-list means wide open: the requested list is returned
/// unchanged. Otherwise only entries present in the allow-list survive, in
/// request order.
///
/// # Example
///
/// ```rust
/// use crudwire::include::pick_allowed_includes;
///
/// let requested = vec!["profile".to_string(), "secrets".to_string()];
/// let allowed = vec!["profile".to_string()];
/// assert_eq!(pick_allowed_includes(requested, &allowed), vec!["profile"]);
/// ```
#[must_use]
pub fn pick_allowed_includes(includes: Vec<String>, allowed: &[String]) -> Vec<String> {
    if allowed.is_empty() {
        return includes;
    }
    includes
        .into_iter()
        .filter(|include| allowed.iter().any(|a| a == include))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize_include("").is_empty());
    }

    #[test]
    fn test_normalize_single() {
        assert_eq!(normalize_include("profile"), owned(&["profile"]));
    }

    #[test]
    fn test_normalize_trims_and_drops_empty_segments() {
        assert_eq!(
            normalize_include(" profile , , orders,"),
            owned(&["profile", "orders"])
        );
    }

    #[test]
    fn test_normalize_preserves_order_and_duplicates() {
        assert_eq!(
            normalize_include("b,a,b"),
            owned(&["b", "a", "b"])
        );
    }

    #[test]
    fn test_pick_allowed_empty_allow_list_is_wide_open() {
        let requested = owned(&["profile", "secrets"]);
        assert_eq!(
            pick_allowed_includes(requested.clone(), &[]),
            requested
        );
    }

    #[test]
    fn test_pick_allowed_intersects() {
        let requested = owned(&["profile", "secrets"]);
        let allowed = owned(&["profile"]);
        assert_eq!(pick_allowed_includes(requested, &allowed), owned(&["profile"]));
    }

    #[test]
    fn test_pick_allowed_preserves_request_order() {
        let requested = owned(&["orders", "profile"]);
        let allowed = owned(&["profile", "orders"]);
        assert_eq!(
            pick_allowed_includes(requested, &allowed),
            owned(&["orders", "profile"])
        );
    }

    #[test]
    fn test_pick_allowed_drops_everything_when_nothing_matches() {
        let requested = owned(&["secrets"]);
        let allowed = owned(&["profile"]);
        assert!(pick_allowed_includes(requested, &allowed).is_empty());
    }
}
