//! In-memory document store
//!
//! Reference [`DocumentStore`] adapter backed by a [`DashMap`]. Supports
//! the predicate shapes the router emits — equality conditions, `$or`
//! groups, `$regex`/`$options` matches — plus the common comparison
//! operators, sort specs with `-` descending prefixes, inclusion and
//! exclusion projections, and single-level relation expansion against
//! registered related stores.
//!
//! Intended for tests and prototyping; every operation is a synchronous
//! map access behind the async interface.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use super::{
    Document, DocumentStore, FindOptions, GetOptions, StoreError, StoreErrorKind, StoreOperation,
    StoreResult, UpdateOptions,
};

/// In-memory document collection
///
/// # Example
///
/// ```rust,ignore
/// use crudwire::store::{DocumentStore, FindOptions, MemoryStore};
/// use serde_json::json;
///
/// let store = MemoryStore::new();
/// store.create(json!({"name": "Alice"}).as_object().unwrap().clone()).await?;
///
/// let all = store.find(&Default::default(), &FindOptions::new()).await?;
/// assert_eq!(all.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: DashMap<String, Document>,
    relations: HashMap<String, Arc<MemoryStore>>,
    required_fields: Vec<String>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a related store for relation expansion
    ///
    /// When a find populates `name`, a string-valued `name` field on the
    /// matched record is replaced by the related record with that
    /// identifier. Unregistered relations are ignored.
    #[must_use]
    pub fn with_relation(mut self, name: impl Into<String>, related: Arc<MemoryStore>) -> Self {
        self.relations.insert(name.into(), related);
        self
    }

    /// Require fields to be present and non-null on create and validated
    /// updates
    #[must_use]
    pub fn with_required_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Number of records currently stored
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Check whether the store holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn validate(&self, doc: &Document, operation: StoreOperation) -> StoreResult<()> {
        for field in &self.required_fields {
            match doc.get(field) {
                Some(value) if !value.is_null() => {}
                _ => {
                    return Err(StoreError::new(
                        operation,
                        StoreErrorKind::ValidationFailed,
                        format!("field `{field}` is required"),
                    ))
                }
            }
        }
        Ok(())
    }

    fn matching(&self, predicate: &Document, operation: StoreOperation) -> StoreResult<Vec<Document>> {
        let mut regexes = RegexCache::new();
        let mut matched = Vec::new();
        for entry in self.docs.iter() {
            if matches_predicate(entry.value(), predicate, operation, &mut regexes)? {
                matched.push(entry.value().clone());
            }
        }
        Ok(matched)
    }

    fn populate(&self, doc: &mut Document, relations: &[String]) {
        for name in relations {
            let Some(related) = self.relations.get(name) else {
                continue;
            };
            let Some(Value::String(id)) = doc.get(name) else {
                continue;
            };
            if let Some(related_doc) = related.docs.get(id.as_str()) {
                doc.insert(name.clone(), Value::Object(related_doc.clone()));
            }
        }
    }
}

impl DocumentStore for MemoryStore {
    async fn find(&self, predicate: &Document, options: &FindOptions) -> StoreResult<Vec<Document>> {
        let mut matched = self.matching(predicate, StoreOperation::Find)?;

        if let Some(spec) = options.sort.as_deref() {
            sort_documents(&mut matched, spec);
        }

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let mut page: Vec<Document> = match options.limit {
            Some(limit) => matched
                .into_iter()
                .skip(skip)
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect(),
            None => matched.into_iter().skip(skip).collect(),
        };

        for doc in &mut page {
            self.populate(doc, &options.populate);
            if let Some(select) = options.select.as_deref() {
                apply_projection(doc, select);
            }
        }

        Ok(page)
    }

    async fn find_by_id(&self, id: &str, options: &GetOptions) -> StoreResult<Option<Document>> {
        let Some(entry) = self.docs.get(id) else {
            return Ok(None);
        };
        let mut doc = entry.value().clone();
        drop(entry);

        self.populate(&mut doc, &options.populate);
        if let Some(select) = options.select.as_deref() {
            apply_projection(&mut doc, select);
        }
        Ok(Some(doc))
    }

    async fn count_documents(&self, predicate: &Document) -> StoreResult<u64> {
        let matched = self.matching(predicate, StoreOperation::Count)?;
        Ok(matched.len() as u64)
    }

    async fn create(&self, mut body: Document) -> StoreResult<Document> {
        self.validate(&body, StoreOperation::Create)?;

        let id = match body.get("id") {
            Some(Value::String(id)) => id.clone(),
            _ => {
                let id = uuid::Uuid::new_v4().to_string();
                body.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };
        body.entry("createdAt".to_string())
            .or_insert_with(|| Value::String(chrono::Utc::now().to_rfc3339()));

        match self.docs.entry(id) {
            dashmap::Entry::Occupied(entry) => Err(StoreError::conflict(format!(
                "duplicate id `{}`",
                entry.key()
            ))),
            dashmap::Entry::Vacant(entry) => {
                entry.insert(body.clone());
                tracing::debug!(total = self.docs.len(), "created document");
                Ok(body)
            }
        }
    }

    async fn update_by_id(
        &self,
        id: &str,
        body: Document,
        options: &UpdateOptions,
    ) -> StoreResult<Option<Document>> {
        let Some(mut entry) = self.docs.get_mut(id) else {
            return Ok(None);
        };

        let before = entry.value().clone();
        let mut updated = before.clone();
        for (key, value) in body {
            // The identifier is immutable.
            if key == "id" {
                continue;
            }
            updated.insert(key, value);
        }

        if options.run_validators {
            self.validate(&updated, StoreOperation::Update)?;
        }

        *entry.value_mut() = updated.clone();
        Ok(Some(if options.return_updated { updated } else { before }))
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<Document>> {
        Ok(self.docs.remove(id).map(|(_, doc)| doc))
    }
}

/// Patterns compiled for one predicate evaluation pass
///
/// A predicate is matched against every stored record; compiling each
/// `$regex` once per query instead of once per record keeps the pass
/// linear in the number of records.
struct RegexCache {
    compiled: HashMap<(String, bool), regex::Regex>,
}

impl RegexCache {
    fn new() -> Self {
        Self {
            compiled: HashMap::new(),
        }
    }

    fn get(
        &mut self,
        pattern: &str,
        case_insensitive: bool,
        operation: StoreOperation,
    ) -> StoreResult<&regex::Regex> {
        match self.compiled.entry((pattern.to_string(), case_insensitive)) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let regex = regex::RegexBuilder::new(pattern)
                    .case_insensitive(case_insensitive)
                    .build()
                    .map_err(|e| StoreError::query_failed(operation, e.to_string()))?;
                Ok(entry.insert(regex))
            }
        }
    }
}

/// Evaluate a predicate against a document
fn matches_predicate(
    doc: &Document,
    predicate: &Document,
    operation: StoreOperation,
    regexes: &mut RegexCache,
) -> StoreResult<bool> {
    for (key, condition) in predicate {
        let matched = if key == "$or" {
            matches_or(doc, condition, operation, regexes)?
        } else {
            matches_condition(doc.get(key), condition, operation, regexes)?
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches_or(
    doc: &Document,
    clauses: &Value,
    operation: StoreOperation,
    regexes: &mut RegexCache,
) -> StoreResult<bool> {
    let Some(clauses) = clauses.as_array() else {
        return Err(StoreError::query_failed(operation, "$or expects an array"));
    };
    for clause in clauses {
        if let Some(sub) = clause.as_object() {
            if matches_predicate(doc, sub, operation, regexes)? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn matches_condition(
    field: Option<&Value>,
    condition: &Value,
    operation: StoreOperation,
    regexes: &mut RegexCache,
) -> StoreResult<bool> {
    let operators = condition
        .as_object()
        .filter(|object| object.keys().any(|k| k.starts_with('$')));

    let Some(operators) = operators else {
        // Plain equality; type-sensitive, like the backing store.
        return Ok(field == Some(condition));
    };

    for (op, operand) in operators {
        let matched = match op.as_str() {
            "$regex" => {
                let Some(pattern) = operand.as_str() else {
                    return Err(StoreError::query_failed(operation, "$regex expects a string"));
                };
                let case_insensitive = operators
                    .get("$options")
                    .and_then(Value::as_str)
                    .is_some_and(|o| o.contains('i'));
                let regex = regexes.get(pattern, case_insensitive, operation)?;
                field.and_then(Value::as_str).is_some_and(|s| regex.is_match(s))
            }
            "$options" => true,
            "$ne" => field != Some(operand),
            "$gt" => compare(field, operand).is_some_and(|o| o == Ordering::Greater),
            "$gte" => compare(field, operand).is_some_and(|o| o != Ordering::Less),
            "$lt" => compare(field, operand).is_some_and(|o| o == Ordering::Less),
            "$lte" => compare(field, operand).is_some_and(|o| o != Ordering::Greater),
            "$in" => {
                let Some(candidates) = operand.as_array() else {
                    return Err(StoreError::query_failed(operation, "$in expects an array"));
                };
                field.is_some_and(|v| candidates.contains(v))
            }
            other => {
                return Err(StoreError::query_failed(
                    operation,
                    format!("unsupported operator `{other}`"),
                ))
            }
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Compare a document field against an operand, when both are comparable
fn compare(field: Option<&Value>, operand: &Value) -> Option<Ordering> {
    let field = field?;
    match (field, operand) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Sort documents by a spec like `-createdAt` or `name,-age`
fn sort_documents(docs: &mut [Document], spec: &str) {
    let keys: Vec<(&str, bool)> = spec
        .split([',', ' '])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| match token.strip_prefix('-') {
            Some(field) => (field, true),
            None => (token, false),
        })
        .collect();

    docs.sort_by(|a, b| {
        for (field, descending) in &keys {
            let ordering = compare_values(a.get(*field), b.get(*field));
            let ordering = if *descending { ordering.reverse() } else { ordering };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Total order over optional JSON values: absent < null < bool < number < string < rest
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(_) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Apply a projection spec like `name email` or `-password`
///
/// A spec whose tokens all carry a `-` prefix drops those fields; otherwise
/// only the named fields (plus `id`) are kept.
fn apply_projection(doc: &mut Document, select: &str) {
    let tokens: Vec<&str> = select
        .split([',', ' '])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();
    if tokens.is_empty() {
        return;
    }

    if tokens.iter().all(|token| token.starts_with('-')) {
        for token in tokens {
            doc.remove(&token[1..]);
        }
    } else {
        let keep: Vec<&str> = tokens
            .iter()
            .filter(|token| !token.starts_with('-'))
            .copied()
            .collect();
        doc.retain(|key, _| key == "id" || keep.contains(&key.as_str()));
    }
}
