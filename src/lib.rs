//! # crudwire
//!
//! Collection-oriented CRUD routing for [`axum`]: point a router builder
//! at a document store and get the five standard routes, a disciplined
//! query dialect on the list route, and a uniform response contract.
//!
//! ## Features
//!
//! - **Query compilation**: `page`/`limit`/`sort` paging with clamped
//!   bounds, bare-parameter equality filters, a `filter` JSON parameter
//!   that wins shallow-merge collisions, and case-insensitive `q` search
//!   across configured fields
//! - **Relation expansion**: comma-separated `include` parameter checked
//!   against a per-collection allow-list
//! - **Uniform envelopes**: `{"data": ...}` on success with `meta`
//!   pagination on lists, `{"error": {"message": ...}}` on failure with
//!   internal messages masked
//! - **Store-agnostic**: the [`store::DocumentStore`] trait is the only
//!   coupling point; [`store::MemoryStore`] ships as the reference adapter
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crudwire::prelude::*;
//!
//! let users = Arc::new(MemoryStore::new().with_required_fields(["name"]));
//!
//! let app = axum::Router::new().nest(
//!     "/users",
//!     CrudRouter::new()
//!         .store(users)
//!         .search_fields(["name", "email"])
//!         .allowed_includes(["profile"])
//!         .build()?,
//! );
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod filter;
pub mod include;
pub mod query;
pub mod response;
pub mod router;
pub mod store;

/// Common imports for building CRUD routers
pub mod prelude {
    pub use crate::error::{ApiError, ApiErrorKind, ApiOperation, BuildError};
    pub use crate::query::ListQuery;
    pub use crate::response::{Created, ItemResponse, ListMeta, ListResponse};
    pub use crate::router::CrudRouter;
    pub use crate::store::{
        Document, DocumentStore, FindOptions, GetOptions, MemoryStore, StoreError, StoreErrorKind,
        StoreOperation, StoreResult, UpdateOptions,
    };
}
