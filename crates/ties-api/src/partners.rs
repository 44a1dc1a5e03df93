//! Handlers for `/partners` endpoints — the mirror of host contact records.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/partners` | Full mirror listing |
//! | `PUT`  | `/partners` | Body: [`Partner`]; insert-or-replace |
//! | `GET`  | `/partners/{id}` | 404 if not mirrored |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use ties_core::{partner::Partner, store::RelationStore};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /partners`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Partner>>, ApiError>
where
  S: RelationStore,
{
  let partners = store.list_partners().await.map_err(ApiError::from_store)?;
  Ok(Json(partners))
}

/// `PUT /partners` — the host pushes contact changes here to keep the
/// mirror current.
pub async fn upsert<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<Partner>,
) -> Result<Json<Partner>, ApiError>
where
  S: RelationStore,
{
  let partner = store
    .upsert_partner(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(partner))
}

/// `GET /partners/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Partner>, ApiError>
where
  S: RelationStore,
{
  let partner = store
    .get_partner(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("partner {id} not found")))?;
  Ok(Json(partner))
}
