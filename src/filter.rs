//! Filter compilation and search augmentation
//!
//! Merges ad-hoc request parameters and an optional structured JSON `filter`
//! expression into a single predicate, then optionally injects a
//! case-insensitive multi-field search condition.
//!
//! A predicate is a [`Document`]: field names mapped to match conditions,
//! either plain equality values or store-native operator objects.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::store::Document;

/// Request parameters with dedicated meaning, excluded from the predicate
pub const RESERVED_PARAMS: [&str; 7] =
    ["page", "limit", "sort", "select", "q", "include", "filter"];

/// Upper bound on the free-text search term, in characters
///
/// Longer terms are truncated before the pattern is built, bounding the
/// cost of the resulting match condition.
pub const MAX_SEARCH_TERM_LEN: usize = 256;

/// Compile raw request parameters into a predicate
///
/// Every parameter outside [`RESERVED_PARAMS`] becomes a string equality
/// condition. If a `filter` parameter is present and parses as a JSON
/// object (not an array), it is shallow-merged over those conditions and
/// its keys win on collision. A `filter` value that fails to parse, or
/// parses to any other shape, is silently ignored — malformed structured
/// filters degrade to the bare-query predicate, never an error.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use crudwire::filter::compile_filter;
///
/// let mut params = HashMap::new();
/// params.insert("status".to_string(), "active".to_string());
/// params.insert("filter".to_string(), r#"{"age":{"$gte":18}}"#.to_string());
///
/// let predicate = compile_filter(&params);
/// assert_eq!(predicate["status"], "active");
/// assert_eq!(predicate["age"]["$gte"], 18);
/// ```
#[must_use]
pub fn compile_filter(params: &HashMap<String, String>) -> Document {
    let mut predicate = Document::new();

    for (key, value) in params {
        if RESERVED_PARAMS.contains(&key.as_str()) {
            continue;
        }
        predicate.insert(key.clone(), Value::String(value.clone()));
    }

    let Some(raw) = params.get("filter") else {
        return predicate;
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(structured)) => {
            for (key, value) in structured {
                predicate.insert(key, value);
            }
        }
        Ok(_) => {
            tracing::debug!("ignoring non-object filter parameter");
        }
        Err(error) => {
            tracing::debug!(%error, "ignoring unparsable filter parameter");
        }
    }

    predicate
}

/// Inject a case-insensitive multi-field search condition
///
/// No-op when the term or the field list is empty. Otherwise the predicate
/// gains an `$or` group requiring at least one of the given fields to
/// contain the term as a case-insensitive substring, conjoined with every
/// existing condition. Any pre-existing `$or` key is overwritten.
///
/// Regex metacharacters in the term are escaped before the pattern is
/// built, so the term always matches as literal text, and the term is
/// truncated to [`MAX_SEARCH_TERM_LEN`] characters.
pub fn apply_search(predicate: &mut Document, term: &str, fields: &[String]) {
    if term.is_empty() || fields.is_empty() {
        return;
    }

    let bounded: String = term.chars().take(MAX_SEARCH_TERM_LEN).collect();
    let pattern = regex::escape(&bounded);

    let clauses: Vec<Value> = fields
        .iter()
        .map(|field| json!({ field: { "$regex": pattern, "$options": "i" } }))
        .collect();

    predicate.insert("$or".to_string(), Value::Array(clauses));
}
