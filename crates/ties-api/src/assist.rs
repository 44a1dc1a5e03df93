//! Handlers for the `/assist` form-assist callbacks.
//!
//! Both narrow selection lists while a user fills in a relation form; they
//! are pure reads over the current catalog and mirror, with no persistence
//! effect.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/assist/other-partner` | Constraints for the other-partner picker |
//! | `GET`  | `/assist/selections` | Selections admitting a given partner |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use ties_core::{
  partner::PartnerFilter,
  selection::{self, SelectionId, TypeSelection},
  store::RelationStore,
};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Other-partner filter ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OtherPartnerParams {
  pub selection_id: SelectionId,
}

/// `GET /assist/other-partner?selection_id=<id>` — once a selection is
/// picked, the kind/category constraints for the other side.
pub async fn other_partner<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<OtherPartnerParams>,
) -> Result<Json<PartnerFilter>, ApiError>
where
  S: RelationStore,
{
  let rtype = store
    .get_relation_type(params.selection_id.type_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| {
      ApiError::from_store(ties_core::Error::UnknownTypeSelection(
        params.selection_id.to_string(),
      ))
    })?;
  let selection = rtype
    .resolve_selection(params.selection_id)
    .map_err(ApiError::from_store)?;
  Ok(Json(selection::other_partner_filter(&selection)))
}

// ─── Selection filter ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SelectionsParams {
  pub partner_id: Uuid,
}

/// `GET /assist/selections?partner_id=<id>` — the selections whose
/// this-side constraints admit the given partner.
pub async fn selections<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SelectionsParams>,
) -> Result<Json<Vec<TypeSelection>>, ApiError>
where
  S: RelationStore,
{
  let partner = store
    .get_partner(params.partner_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("partner {} not found", params.partner_id))
    })?;
  let catalog = store
    .list_selections()
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(selection::selections_for_partner(&partner, &catalog)))
}
