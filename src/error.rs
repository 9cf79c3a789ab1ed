//! API error types
//!
//! [`ApiError`] is the single error type routed to clients. It carries the
//! operation that failed, a kind that fixes the HTTP status, and a
//! message. The response body is always `{"error": {"message": ...}}`;
//! internal kinds have their message masked and logged rather than leaked.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::store::{StoreError, StoreErrorKind, StoreOperation};

/// Error raised when a router is assembled from an incomplete builder
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// No backing store was provided
    #[error("a document store is required to build a CRUD router")]
    MissingStore,
}

/// The API operation during which an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOperation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        write!(f, "{s}")
    }
}

impl From<StoreOperation> for ApiOperation {
    fn from(operation: StoreOperation) -> Self {
        match operation {
            StoreOperation::Find | StoreOperation::Count => Self::List,
            StoreOperation::FindById => Self::Get,
            StoreOperation::Create => Self::Create,
            StoreOperation::Update => Self::Update,
            StoreOperation::Delete => Self::Delete,
        }
    }
}

/// Kind of API error, fixing the HTTP status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// No record matches the requested identifier (404)
    NotFound,
    /// The request itself is malformed (400)
    BadRequest,
    /// The store rejected the payload (422)
    ValidationFailed,
    /// A record with the requested identifier already exists (409)
    Conflict,
    /// The backing store cannot be reached (503)
    ServiceUnavailable,
    /// The backing store took too long (504)
    Timeout,
    /// Anything else (500); the message is masked in responses
    Internal,
}

impl ApiErrorKind {
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict => StatusCode::CONFLICT,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Generic phrase shown to clients instead of the real message, for
    /// kinds whose detail must not leak
    #[must_use]
    pub const fn masked_message(self) -> Option<&'static str> {
        match self {
            Self::Internal => Some("Internal server error"),
            Self::ServiceUnavailable => Some("Service unavailable"),
            _ => None,
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not found",
            Self::BadRequest => "bad request",
            Self::ValidationFailed => "validation failed",
            Self::Conflict => "conflict",
            Self::ServiceUnavailable => "service unavailable",
            Self::Timeout => "timeout",
            Self::Internal => "internal",
        };
        write!(f, "{s}")
    }
}

/// Error returned to API clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub operation: ApiOperation,
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(operation: ApiOperation, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
        }
    }

    /// The standard missing-record error
    #[must_use]
    pub fn not_found(operation: ApiOperation) -> Self {
        Self::new(operation, ApiErrorKind::NotFound, "Not found")
    }

    /// HTTP status this error maps to
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API {} error during {}: {}",
            self.kind, self.operation, self.message
        )
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        let kind = match error.kind {
            StoreErrorKind::ValidationFailed => ApiErrorKind::ValidationFailed,
            StoreErrorKind::Conflict => ApiErrorKind::Conflict,
            StoreErrorKind::ConnectionFailed => ApiErrorKind::ServiceUnavailable,
            StoreErrorKind::Timeout => ApiErrorKind::Timeout,
            StoreErrorKind::QueryFailed => ApiErrorKind::BadRequest,
            StoreErrorKind::SerializationError | StoreErrorKind::Other => ApiErrorKind::Internal,
        };
        Self::new(error.operation.into(), kind, error.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if let Some(masked) = self.kind.masked_message() {
            tracing::error!(
                operation = %self.operation,
                kind = %self.kind,
                message = %self.message,
                "request failed"
            );
            masked.to_string()
        } else {
            tracing::debug!(
                operation = %self.operation,
                kind = %self.kind,
                message = %self.message,
                "request failed"
            );
            self.message
        };
        (status, Json(json!({"error": {"message": message}}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiErrorKind::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiErrorKind::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiErrorKind::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiErrorKind::ValidationFailed.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiErrorKind::ServiceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ApiErrorKind::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            ApiErrorKind::Internal.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message() {
        let error = ApiError::not_found(ApiOperation::Get);
        assert_eq!(error.message, "Not found");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_display() {
        let error = ApiError::new(ApiOperation::Create, ApiErrorKind::ValidationFailed, "boom");
        assert_eq!(
            error.to_string(),
            "API validation failed error during create: boom"
        );
    }

    #[test]
    fn test_from_store_error_maps_kind_and_operation() {
        let store_error = StoreError::validation_failed("name required");
        let api_error = ApiError::from(store_error);
        assert_eq!(api_error.kind, ApiErrorKind::ValidationFailed);
        assert_eq!(api_error.operation, ApiOperation::Create);
        assert_eq!(api_error.message, "name required");
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::not_found(ApiOperation::Get).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({"error": {"message": "Not found"}}));
    }

    #[tokio::test]
    async fn test_internal_message_is_masked() {
        let error = ApiError::new(
            ApiOperation::List,
            ApiErrorKind::Internal,
            "connection string leaked",
        );
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_unavailable_message_is_masked() {
        let error = ApiError::from(StoreError::connection_failed("dns lookup failed"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "Service unavailable");
    }
}
