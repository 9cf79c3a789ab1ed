//! Store error types
//!
//! Structured errors for store operations, carrying the operation in
//! progress and the failure category so the HTTP layer can map them to a
//! status without inspecting message strings.

use std::fmt;

/// Operation being performed when the store error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Finding records by predicate
    Find,
    /// Finding a single record by identifier
    FindById,
    /// Counting records by predicate
    Count,
    /// Creating a record
    Create,
    /// Updating a record by identifier
    Update,
    /// Deleting a record by identifier
    Delete,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Find => write!(f, "find"),
            Self::FindById => write!(f, "find_by_id"),
            Self::Count => write!(f, "count"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Category of store error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// The store's own field validators rejected the data
    ValidationFailed,
    /// A record with the same identifier already exists
    Conflict,
    /// Failed to reach the store
    ConnectionFailed,
    /// Operation timed out
    Timeout,
    /// Query execution failed
    QueryFailed,
    /// Serialization or deserialization error
    SerializationError,
    /// Other unclassified error
    Other,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::Conflict => write!(f, "conflict"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::QueryFailed => write!(f, "query_failed"),
            Self::SerializationError => write!(f, "serialization_error"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured store error with operation context
///
/// # Example
///
/// ```rust
/// use crudwire::store::{StoreError, StoreErrorKind, StoreOperation};
///
/// let error = StoreError::validation_failed("name is required");
/// assert_eq!(error.kind, StoreErrorKind::ValidationFailed);
/// assert_eq!(error.operation, StoreOperation::Create);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    /// The operation being performed when the error occurred
    pub operation: StoreOperation,
    /// The category of error
    pub kind: StoreErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl StoreError {
    /// Create a new store error
    pub fn new(
        operation: StoreOperation,
        kind: StoreErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
        }
    }

    /// Create a validation failure raised during create
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(
            StoreOperation::Create,
            StoreErrorKind::ValidationFailed,
            message,
        )
    }

    /// Create a duplicate-identifier conflict raised during create
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StoreOperation::Create, StoreErrorKind::Conflict, message)
    }

    /// Create a connection failure
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            StoreOperation::Find,
            StoreErrorKind::ConnectionFailed,
            message,
        )
    }

    /// Create a query failure
    pub fn query_failed(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::QueryFailed, message)
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: StoreOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Check if this error is transient and may succeed on retry
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            StoreErrorKind::ConnectionFailed | StoreErrorKind::Timeout
        )
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Store {} error during {}: {}",
            self.kind, self.operation, self.message
        )
    }
}

impl std::error::Error for StoreError {}
