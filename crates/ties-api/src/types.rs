//! Handlers for `/types` and `/selections` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/types` | All catalog entries |
//! | `POST` | `/types` | Body: [`RelationTypeFields`]; returns 201 |
//! | `GET`  | `/types/{id}` | 404 if not found |
//! | `PUT`  | `/types/{id}` | Whole-field replacement |
//! | `GET`  | `/selections` | The derived `(type, direction)` catalog |
//!
//! Symmetry propagation is the store's job; these handlers only shuttle
//! fields through.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use ties_core::{
  relation_type::{RelationType, RelationTypeFields},
  selection::TypeSelection,
  store::RelationStore,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /types`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<RelationType>>, ApiError>
where
  S: RelationStore,
{
  let types = store
    .list_relation_types()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(types))
}

/// `POST /types` — returns 201 + the stored type, with any symmetry
/// propagation already applied.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<RelationTypeFields>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RelationStore,
{
  let rtype = store
    .create_relation_type(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(rtype)))
}

/// `GET /types/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<RelationType>, ApiError>
where
  S: RelationStore,
{
  let rtype = store
    .get_relation_type(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("relation type {id} not found")))?;
  Ok(Json(rtype))
}

/// `PUT /types/{id}` — whole-field replacement.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RelationTypeFields>,
) -> Result<Json<RelationType>, ApiError>
where
  S: RelationStore,
{
  let rtype = store
    .update_relation_type(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(rtype))
}

/// `GET /selections`
pub async fn selections<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<TypeSelection>>, ApiError>
where
  S: RelationStore,
{
  let selections = store
    .list_selections()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(selections))
}
