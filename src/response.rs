//! Response envelopes
//!
//! Every successful route responds with a `data` envelope; list routes add
//! a `meta` block carrying pagination facts. Keeping the envelope in one
//! place keeps clients off positional assumptions about payload shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::store::Document;

/// Envelope for a single record, returned with `200 OK`
#[derive(Debug, Clone, Serialize)]
pub struct ItemResponse {
    pub data: Document,
}

impl ItemResponse {
    #[must_use]
    pub const fn new(data: Document) -> Self {
        Self { data }
    }
}

impl IntoResponse for ItemResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Envelope for a freshly created record, returned with `201 Created`
#[derive(Debug, Clone, Serialize)]
pub struct Created {
    pub data: Document,
}

impl Created {
    #[must_use]
    pub const fn new(data: Document) -> Self {
        Self { data }
    }
}

impl IntoResponse for Created {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

/// Envelope for a page of records with pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub data: Vec<Document>,
    pub meta: ListMeta,
}

impl ListResponse {
    #[must_use]
    pub fn new(data: Vec<Document>, meta: ListMeta) -> Self {
        Self { data, meta }
    }
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Pagination facts for a list response
///
/// `pages` is derived from `total` and `limit`, never below 1 so an empty
/// collection still reports a single (empty) page.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ListMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u64,
}

impl ListMeta {
    /// Compute metadata for a page of results
    #[must_use]
    pub fn new(total: u64, page: u32, limit: u32) -> Self {
        let pages = total.div_ceil(u64::from(limit.max(1))).max(1);
        Self {
            total,
            page,
            limit,
            pages,
        }
    }
}
