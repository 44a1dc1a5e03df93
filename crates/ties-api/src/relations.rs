//! Handlers for `/relations` endpoints — the stored edges.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/relations` | Optional filters, see [`ListParams`] |
//! | `POST`   | `/relations` | Body: [`NewRelation`]; `?default_left=` carries the contextual partner |
//! | `GET`    | `/relations/{id}` | 404 if not found |
//! | `PUT`    | `/relations/{id}` | Whole-field replacement, fully re-validated |
//! | `DELETE` | `/relations/{id}` | Hard delete |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use ties_core::{
  relation::{NewRelation, Relation, RelationFields},
  store::{RelationQuery, RelationStore},
};
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub type_id:          Option<Uuid>,
  pub left_partner_id:  Option<Uuid>,
  pub right_partner_id: Option<Uuid>,
  /// Match the partner on either side.
  pub partner_id:       Option<Uuid>,
  #[serde(default)]
  pub active_only:      bool,
  /// Only relations whose validity window contains this date.
  pub active_at:        Option<NaiveDate>,
  pub limit:            Option<usize>,
  pub offset:           Option<usize>,
}

impl From<ListParams> for RelationQuery {
  fn from(p: ListParams) -> Self {
    RelationQuery {
      type_id:          p.type_id,
      left_partner_id:  p.left_partner_id,
      right_partner_id: p.right_partner_id,
      partner_id:       p.partner_id,
      active_only:      p.active_only,
      active_at:        p.active_at,
      limit:            p.limit,
      offset:           p.offset,
    }
  }
}

/// `GET /relations[?type_id=...][&partner_id=...][&active_only=true]...`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Relation>>, ApiError>
where
  S: RelationStore,
{
  let query = RelationQuery::from(params);
  let relations = store
    .list_relations(&query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(relations))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct CreateParams {
  /// The contextual "current partner"; used only when the body omits
  /// `left_partner_id`.
  pub default_left: Option<Uuid>,
}

/// `POST /relations[?default_left=<id>]` — returns 201 + the stored relation.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<CreateParams>,
  Json(body): Json<NewRelation>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RelationStore,
{
  let relation = store
    .create_relation(body, params.default_left)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(relation)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /relations/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Relation>, ApiError>
where
  S: RelationStore,
{
  let relation = store
    .get_relation(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("relation {id} not found")))?;
  Ok(Json(relation))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /relations/{id}` — whole-field replacement; all invariants run
/// again against the new field values.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RelationFields>,
) -> Result<Json<Relation>, ApiError>
where
  S: RelationStore,
{
  let relation = store
    .update_relation(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(relation))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /relations/{id}`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RelationStore,
{
  store
    .delete_relation(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
