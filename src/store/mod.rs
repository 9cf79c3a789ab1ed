//! Document-store abstraction
//!
//! This module defines the capability set the CRUD router requires from a
//! backing store: predicate-filtered finds with projection, sorting,
//! relation expansion and pagination; lookup, create, partial update, and
//! delete by identifier; and a predicate-filtered count.
//!
//! The trait uses RPITIT (Return Position Impl Trait In Traits) for
//! ergonomic async methods without `async_trait`. A concrete adapter is
//! written per target store; [`MemoryStore`] ships as the reference
//! adapter.
//!
//! # Example
//!
//! ```rust,ignore
//! use crudwire::store::{DocumentStore, FindOptions, StoreResult};
//!
//! let options = FindOptions::new()
//!     .select("name email")
//!     .sort("-createdAt")
//!     .populate("profile")
//!     .skip(20)
//!     .limit(20);
//!
//! let users = store.find(&predicate, &options).await?;
//! ```

mod error;
mod memory;

pub use error::{StoreError, StoreErrorKind, StoreOperation};
pub use memory::MemoryStore;

use std::future::Future;

/// A schema-less record: field names mapped to JSON values
///
/// Doubles as the predicate representation, where values are either plain
/// equality conditions or store-native operator objects.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Options for predicate-filtered find operations
///
/// A chainable builder mirroring the query chain of document-store drivers
/// (`select` → `sort` → `populate` → `skip` → `limit`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Projection specification; `None` returns all fields
    pub select: Option<String>,
    /// Sort specification; `None` leaves store order
    pub sort: Option<String>,
    /// Relations to expand, in order
    pub populate: Vec<String>,
    /// Number of matching records to skip
    pub skip: u64,
    /// Maximum number of records to return; `None` is unbounded
    pub limit: Option<u64>,
}

impl FindOptions {
    /// Create empty options (all fields, store order, no pagination)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the projection specification
    #[must_use]
    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    /// Set the sort specification
    #[must_use]
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Add a relation to expand
    #[must_use]
    pub fn populate(mut self, relation: impl Into<String>) -> Self {
        self.populate.push(relation.into());
        self
    }

    /// Set the number of records to skip
    #[must_use]
    pub const fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    /// Set the maximum number of records to return
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Options for single-record lookup by identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Projection specification; `None` returns all fields
    pub select: Option<String>,
    /// Relations to expand, in order
    pub populate: Vec<String>,
}

impl GetOptions {
    /// Create empty options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the projection specification
    #[must_use]
    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    /// Add a relation to expand
    #[must_use]
    pub fn populate(mut self, relation: impl Into<String>) -> Self {
        self.populate.push(relation.into());
        self
    }
}

/// Options for partial updates by identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Return the post-update record instead of the pre-update one
    pub return_updated: bool,
    /// Run the store's own field validators against the update
    pub run_validators: bool,
}

impl UpdateOptions {
    /// Create options with both flags off (driver defaults)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            return_updated: false,
            run_validators: false,
        }
    }

    /// Request the post-update record
    #[must_use]
    pub const fn return_updated(mut self, yes: bool) -> Self {
        self.return_updated = yes;
        self
    }

    /// Request store-side validation of the update
    #[must_use]
    pub const fn run_validators(mut self, yes: bool) -> Self {
        self.run_validators = yes;
        self
    }
}

/// Capability set required from a backing document store
///
/// Each method is a single store round-trip; the router composes them but
/// never retries them. Implementations map their native errors to
/// [`StoreError`].
pub trait DocumentStore: Send + Sync {
    /// Find records matching the predicate, honoring projection, sort,
    /// relation expansion, and pagination
    fn find(
        &self,
        predicate: &Document,
        options: &FindOptions,
    ) -> impl Future<Output = StoreResult<Vec<Document>>> + Send;

    /// Look up a single record by identifier
    ///
    /// Returns `Ok(None)` when no record matches.
    fn find_by_id(
        &self,
        id: &str,
        options: &GetOptions,
    ) -> impl Future<Output = StoreResult<Option<Document>>> + Send;

    /// Count all records matching the predicate, ignoring pagination
    fn count_documents(
        &self,
        predicate: &Document,
    ) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Create a new record from the given body
    ///
    /// May fail with a validation or duplicate-identifier error from the
    /// store.
    fn create(&self, body: Document) -> impl Future<Output = StoreResult<Document>> + Send;

    /// Apply a partial update to the record with the given identifier
    ///
    /// Returns `Ok(None)` when no record matches.
    fn update_by_id(
        &self,
        id: &str,
        body: Document,
        options: &UpdateOptions,
    ) -> impl Future<Output = StoreResult<Option<Document>>> + Send;

    /// Remove the record with the given identifier, returning it
    ///
    /// Returns `Ok(None)` when no record matches.
    fn delete_by_id(&self, id: &str) -> impl Future<Output = StoreResult<Option<Document>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_options_chain() {
        let options = FindOptions::new()
            .select("name email")
            .sort("-createdAt")
            .populate("profile")
            .populate("orders")
            .skip(40)
            .limit(20);

        assert_eq!(options.select.as_deref(), Some("name email"));
        assert_eq!(options.sort.as_deref(), Some("-createdAt"));
        assert_eq!(options.populate, vec!["profile", "orders"]);
        assert_eq!(options.skip, 40);
        assert_eq!(options.limit, Some(20));
    }

    #[test]
    fn test_find_options_default() {
        let options = FindOptions::new();
        assert!(options.select.is_none());
        assert!(options.sort.is_none());
        assert!(options.populate.is_empty());
        assert_eq!(options.skip, 0);
        assert!(options.limit.is_none());
    }

    #[test]
    fn test_update_options_flags() {
        let options = UpdateOptions::new().return_updated(true).run_validators(true);
        assert!(options.return_updated);
        assert!(options.run_validators);

        let defaults = UpdateOptions::default();
        assert!(!defaults.return_updated);
        assert!(!defaults.run_validators);
    }

    #[test]
    fn test_get_options_chain() {
        let options = GetOptions::new().select("name").populate("profile");
        assert_eq!(options.select.as_deref(), Some("name"));
        assert_eq!(options.populate, vec!["profile"]);
    }
}
