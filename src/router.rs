//! CRUD router assembly
//!
//! [`CrudRouter`] turns a [`DocumentStore`] into an [`axum::Router`] with
//! the five standard collection routes:
//!
//! | Method   | Path    | Operation                        |
//! |----------|---------|----------------------------------|
//! | `GET`    | `/`     | paginated, filtered list         |
//! | `POST`   | `/`     | create                           |
//! | `GET`    | `/{id}` | fetch one                        |
//! | `PATCH`  | `/{id}` | partial update                   |
//! | `DELETE` | `/{id}` | delete, returning the record     |
//!
//! The list route compiles request parameters into a store query: paging
//! and sort via [`ListQuery`], equality and JSON filters via
//! [`compile_filter`], free-text search via [`apply_search`], and relation
//! expansion gated by the configured allow-list. The returned router nests
//! under any collection prefix.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crudwire::router::CrudRouter;
//! use crudwire::store::MemoryStore;
//!
//! let users = Arc::new(MemoryStore::new());
//! let app = axum::Router::new().nest(
//!     "/users",
//!     CrudRouter::new()
//!         .store(users)
//!         .search_fields(["name", "email"])
//!         .allowed_includes(["profile"])
//!         .build()?,
//! );
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{ApiError, ApiOperation, BuildError};
use crate::filter::{apply_search, compile_filter};
use crate::include::{normalize_include, pick_allowed_includes};
use crate::query::ListQuery;
use crate::response::{Created, ItemResponse, ListMeta, ListResponse};
use crate::store::{Document, DocumentStore, FindOptions, GetOptions, UpdateOptions};

/// Builder for a collection's CRUD routes
///
/// The store is the only required piece; everything else defaults closed
/// (no searchable fields, no expandable relations) except the include
/// allow-list, which when left empty admits every requested relation.
#[derive(Debug)]
pub struct CrudRouter<S> {
    store: Option<Arc<S>>,
    search_fields: Vec<String>,
    allowed_includes: Vec<String>,
    id_param: String,
}

impl<S> Default for CrudRouter<S> {
    fn default() -> Self {
        Self {
            store: None,
            search_fields: Vec::new(),
            allowed_includes: Vec::new(),
            id_param: "id".to_string(),
        }
    }
}

impl<S> CrudRouter<S>
where
    S: DocumentStore + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backing store
    #[must_use]
    pub fn store(mut self, store: Arc<S>) -> Self {
        self.store = Some(store);
        self
    }

    /// Fields matched by the `q` search parameter
    ///
    /// With no search fields configured, `q` is ignored.
    #[must_use]
    pub fn search_fields<I, T>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Relations clients may expand through the `include` parameter
    ///
    /// An empty allow-list admits every requested relation.
    #[must_use]
    pub fn allowed_includes<I, T>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.allowed_includes = relations.into_iter().map(Into::into).collect();
        self
    }

    /// Rename the path parameter for the single-record routes
    ///
    /// Defaults to `id`; affects only the generated route path.
    #[must_use]
    pub fn id_param(mut self, name: impl Into<String>) -> Self {
        self.id_param = name.into();
        self
    }

    /// Assemble the router
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingStore`] when no store was provided.
    /// Misconfiguration surfaces here, before any request is served.
    pub fn build(self) -> Result<Router, BuildError> {
        let store = self.store.ok_or(BuildError::MissingStore)?;
        let state = Arc::new(CrudState {
            store,
            search_fields: self.search_fields,
            allowed_includes: self.allowed_includes,
        });

        let item_path = format!("/{{{}}}", self.id_param);
        Ok(Router::new()
            .route("/", get(list::<S>).post(create_one::<S>))
            .route(
                &item_path,
                get(get_one::<S>).patch(update_one::<S>).delete(delete_one::<S>),
            )
            .with_state(state))
    }
}

/// Shared per-collection state behind the handlers
struct CrudState<S> {
    store: Arc<S>,
    search_fields: Vec<String>,
    allowed_includes: Vec<String>,
}

impl<S> CrudState<S> {
    fn includes_for(&self, include: &str) -> Vec<String> {
        pick_allowed_includes(normalize_include(include), &self.allowed_includes)
    }
}

async fn list<S: DocumentStore>(
    State(state): State<Arc<CrudState<S>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ListResponse, ApiError> {
    let query = ListQuery::from_params(&params);
    let mut predicate = compile_filter(&params);
    apply_search(&mut predicate, query.search(), &state.search_fields);

    let mut options = FindOptions::new()
        .sort(query.sort())
        .skip(query.skip())
        .limit(u64::from(query.limit()));
    if !query.select().is_empty() {
        options = options.select(query.select());
    }
    for relation in state.includes_for(query.include()) {
        options = options.populate(relation);
    }

    tracing::debug!(
        page = query.page(),
        limit = query.limit(),
        predicate_fields = predicate.len(),
        "listing collection"
    );

    // The page and the total are independent reads; issue them together.
    let (data, total) = futures::try_join!(
        state.store.find(&predicate, &options),
        state.store.count_documents(&predicate)
    )?;

    Ok(ListResponse::new(
        data,
        ListMeta::new(total, query.page(), query.limit()),
    ))
}

async fn get_one<S: DocumentStore>(
    State(state): State<Arc<CrudState<S>>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ItemResponse, ApiError> {
    let mut options = GetOptions::new();
    if let Some(select) = params.get("select").filter(|s| !s.trim().is_empty()) {
        options = options.select(select.clone());
    }
    let include = params.get("include").map(String::as_str).unwrap_or_default();
    for relation in state.includes_for(include) {
        options = options.populate(relation);
    }

    state
        .store
        .find_by_id(&id, &options)
        .await?
        .map(ItemResponse::new)
        .ok_or_else(|| ApiError::not_found(ApiOperation::Get))
}

async fn create_one<S: DocumentStore>(
    State(state): State<Arc<CrudState<S>>>,
    Json(body): Json<Document>,
) -> Result<Created, ApiError> {
    let created = state.store.create(body).await?;
    tracing::debug!("created record");
    Ok(Created::new(created))
}

async fn update_one<S: DocumentStore>(
    State(state): State<Arc<CrudState<S>>>,
    Path(id): Path<String>,
    Json(body): Json<Document>,
) -> Result<ItemResponse, ApiError> {
    let options = UpdateOptions::new().return_updated(true).run_validators(true);
    state
        .store
        .update_by_id(&id, body, &options)
        .await?
        .map(ItemResponse::new)
        .ok_or_else(|| ApiError::not_found(ApiOperation::Update))
}

async fn delete_one<S: DocumentStore>(
    State(state): State<Arc<CrudState<S>>>,
    Path(id): Path<String>,
) -> Result<ItemResponse, ApiError> {
    state
        .store
        .delete_by_id(&id)
        .await?
        .map(ItemResponse::new)
        .ok_or_else(|| ApiError::not_found(ApiOperation::Delete))
}
