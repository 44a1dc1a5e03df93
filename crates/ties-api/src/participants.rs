//! Handler for `GET /participants`.
//!
//! Given a set of relation or view ids and a side selector, returns the
//! distinct partner ids participating on that side. View ids decode to
//! their underlying relation id without a lookup, so both forms mix freely
//! in the same request.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use ties_core::{partner::SideSelector, store::RelationStore, view::ViewId};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct Params {
  /// Comma-separated relation uuids and/or encoded view ids.
  pub ids:  String,
  pub side: SideSelector,
}

/// `GET /participants?ids=<csv>&side=left|right|all`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<Params>,
) -> Result<Json<Vec<Uuid>>, ApiError>
where
  S: RelationStore,
{
  let mut relation_ids = Vec::new();
  for token in params.ids.split(',').map(str::trim).filter(|t| !t.is_empty()) {
    if let Ok(id) = token.parse::<Uuid>() {
      relation_ids.push(id);
    } else if let Ok(view_id) = token.parse::<ViewId>() {
      relation_ids.push(view_id.relation_id);
    } else {
      return Err(ApiError::BadRequest(format!(
        "not a relation or view id: {token:?}"
      )));
    }
  }
  relation_ids.sort_unstable();
  relation_ids.dedup();

  let partners = store
    .participants(&relation_ids, params.side)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(partners))
}
