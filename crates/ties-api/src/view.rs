//! Handlers for `/view` endpoints — the bidirectional relation view.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/view` | Each relation appears forward and inverse |
//! | `POST`   | `/view` | Body: [`NewViewRelation`]; `?default_this=` carries the contextual partner |
//! | `GET`    | `/view/{id}` | `{id}` is the `"<uuid>.f"` / `"<uuid>.i"` form |
//! | `PUT`    | `/view/{id}` | Translated onto the underlying relation |
//! | `DELETE` | `/view/{id}` | Deletes the underlying relation (both rows) |
//!
//! View ids are parsed here rather than by the path extractor so a
//! malformed id surfaces as the unresolvable-view-id validation error, not
//! a generic routing rejection.

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
  selection::SelectionId,
  store::{RelationStore, ViewQuery},
  view::{NewViewRelation, RelationViewRow, ViewId, ViewRelationFields},
};
use uuid::Uuid;

use crate::error::ApiError;

fn parse_view_id(raw: &str) -> Result<ViewId, ApiError> {
  raw.parse().map_err(ApiError::from_store)
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub this_partner_id:  Option<Uuid>,
  pub other_partner_id: Option<Uuid>,
  pub type_id:          Option<Uuid>,
  pub selection_id:     Option<SelectionId>,
  #[serde(default)]
  pub active_only:      bool,
  pub active_at:        Option<NaiveDate>,
  pub limit:            Option<usize>,
  pub offset:           Option<usize>,
}

impl From<ListParams> for ViewQuery {
  fn from(p: ListParams) -> Self {
    ViewQuery {
      this_partner_id:  p.this_partner_id,
      other_partner_id: p.other_partner_id,
      type_id:          p.type_id,
      selection_id:     p.selection_id,
      active_only:      p.active_only,
      active_at:        p.active_at,
      limit:            p.limit,
      offset:           p.offset,
    }
  }
}

/// `GET /view[?this_partner_id=...][&selection_id=...][&active_only=true]...`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<RelationViewRow>>, ApiError>
where
  S: RelationStore,
{
  let query = ViewQuery::from(params);
  let rows = store.list_view(&query).await.map_err(ApiError::from_store)?;
  Ok(Json(rows))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct CreateParams {
  /// The contextual "current partner"; used only when the body omits
  /// `this_partner_id`.
  pub default_this: Option<Uuid>,
}

/// `POST /view[?default_this=<id>]` — returns 201 + the created row in the
/// orientation of the picked selection.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<CreateParams>,
  Json(body): Json<NewViewRelation>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RelationStore,
{
  let row = store
    .create_via_view(body, params.default_this)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(row)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /view/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
) -> Result<Json<RelationViewRow>, ApiError>
where
  S: RelationStore,
{
  let id = parse_view_id(&raw_id)?;
  let row = store
    .get_view_row(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("view row {id} not found")))?;
  Ok(Json(row))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /view/{id}` — this/other-keyed fields are translated back onto the
/// underlying relation; only stored-relation fields are accepted.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
  Json(body): Json<ViewRelationFields>,
) -> Result<Json<RelationViewRow>, ApiError>
where
  S: RelationStore,
{
  let id = parse_view_id(&raw_id)?;
  let row = store
    .update_via_view(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(row))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /view/{id}` — removes the single underlying relation, so the
/// sibling orientation disappears with it.
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: RelationStore,
{
  let id = parse_view_id(&raw_id)?;
  store
    .delete_via_view(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
