//! The `RelationStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `ties-store-sqlite`).
//! Higher layers (`ties-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  partner::{Partner, SideSelector},
  relation::{NewRelation, Relation, RelationFields},
  relation_type::{RelationType, RelationTypeFields},
  selection::{SelectionId, TypeSelection},
  view::{NewViewRelation, RelationViewRow, ViewId, ViewRelationFields},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`RelationStore::list_relations`].
#[derive(Debug, Clone, Default)]
pub struct RelationQuery {
  pub type_id:          Option<Uuid>,
  pub left_partner_id:  Option<Uuid>,
  pub right_partner_id: Option<Uuid>,
  /// Match the partner on either side.
  pub partner_id:       Option<Uuid>,
  /// If `true`, only `active` relations are returned.
  pub active_only:      bool,
  /// Only relations whose validity window contains this date (the host
  /// supplies "today"; there is no ambient clock here).
  pub active_at:        Option<NaiveDate>,
  pub limit:            Option<usize>,
  pub offset:           Option<usize>,
}

/// Parameters for [`RelationStore::list_view`]. Filters apply per view row,
/// so a partner filter matches whichever orientation puts the partner on
/// "this" side.
#[derive(Debug, Clone, Default)]
pub struct ViewQuery {
  pub this_partner_id:  Option<Uuid>,
  pub other_partner_id: Option<Uuid>,
  pub type_id:          Option<Uuid>,
  pub selection_id:     Option<SelectionId>,
  pub active_only:      bool,
  pub active_at:        Option<NaiveDate>,
  pub limit:            Option<usize>,
  pub offset:           Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a partner-relation store backend.
///
/// Every write validates the relation invariants first and is
/// all-or-nothing: the first violated invariant fails the call and nothing
/// is persisted. Validation is read-then-write; its correctness under
/// concurrent writers is bounded by the backend's isolation level.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RelationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Partners (host mirror) ────────────────────────────────────────────

  /// Insert or replace the mirror of a host contact record.
  fn upsert_partner(
    &self,
    partner: Partner,
  ) -> impl Future<Output = Result<Partner, Self::Error>> + Send + '_;

  /// Retrieve a mirrored partner by id. Returns `None` if not found.
  fn get_partner(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Partner>, Self::Error>> + Send + '_;

  fn list_partners(
    &self,
  ) -> impl Future<Output = Result<Vec<Partner>, Self::Error>> + Send + '_;

  // ── Relation types ────────────────────────────────────────────────────

  /// Create a type. Symmetry propagation (left side copied onto the right)
  /// is applied before persisting.
  fn create_relation_type(
    &self,
    fields: RelationTypeFields,
  ) -> impl Future<Output = Result<RelationType, Self::Error>> + Send + '_;

  /// Whole-field replacement of a type, with symmetry propagation applied
  /// before persisting.
  fn update_relation_type(
    &self,
    id: Uuid,
    fields: RelationTypeFields,
  ) -> impl Future<Output = Result<RelationType, Self::Error>> + Send + '_;

  fn get_relation_type(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<RelationType>, Self::Error>> + Send + '_;

  fn list_relation_types(
    &self,
  ) -> impl Future<Output = Result<Vec<RelationType>, Self::Error>> + Send + '_;

  /// The derived `(type, direction)` catalog, recomputed from the current
  /// type set on every call.
  fn list_selections(
    &self,
  ) -> impl Future<Output = Result<Vec<TypeSelection>, Self::Error>> + Send + '_;

  // ── Relations ─────────────────────────────────────────────────────────

  /// Validate and persist a new relation. `default_left` is the contextual
  /// current partner, used only when the input omits the left partner.
  fn create_relation(
    &self,
    input: NewRelation,
    default_left: Option<Uuid>,
  ) -> impl Future<Output = Result<Relation, Self::Error>> + Send + '_;

  /// Validate and apply a whole-field replacement of an existing relation.
  fn update_relation(
    &self,
    id: Uuid,
    fields: RelationFields,
  ) -> impl Future<Output = Result<Relation, Self::Error>> + Send + '_;

  /// Hard-delete a relation (soft deletion is `active = false` via update).
  fn delete_relation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_relation(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Relation>, Self::Error>> + Send + '_;

  fn list_relations<'a>(
    &'a self,
    query: &'a RelationQuery,
  ) -> impl Future<Output = Result<Vec<Relation>, Self::Error>> + Send + 'a;

  // ── Bidirectional view ────────────────────────────────────────────────

  /// Every stored relation matching the query, projected into both
  /// orientations.
  fn list_view<'a>(
    &'a self,
    query: &'a ViewQuery,
  ) -> impl Future<Output = Result<Vec<RelationViewRow>, Self::Error>> + Send + 'a;

  /// A single view row. Returns `None` when the underlying relation does
  /// not exist.
  fn get_view_row(
    &self,
    id: ViewId,
  ) -> impl Future<Output = Result<Option<RelationViewRow>, Self::Error>> + Send + '_;

  /// Create through the view: resolve the selection to `(type, direction)`,
  /// swap this/other into left/right when inverse, delegate to
  /// [`RelationStore::create_relation`], and return the created row in the
  /// requested orientation.
  fn create_via_view(
    &self,
    input: NewViewRelation,
    default_this: Option<Uuid>,
  ) -> impl Future<Output = Result<RelationViewRow, Self::Error>> + Send + '_;

  /// Update through the view: translate this/other-keyed fields back to
  /// left/right under the new selection's direction and delegate to
  /// [`RelationStore::update_relation`] on the underlying relation.
  fn update_via_view(
    &self,
    id: ViewId,
    fields: ViewRelationFields,
  ) -> impl Future<Output = Result<RelationViewRow, Self::Error>> + Send + '_;

  /// Delete the single relation underlying a view row; both orientations
  /// disappear with it.
  fn delete_via_view(
    &self,
    id: ViewId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Participants ──────────────────────────────────────────────────────

  /// The distinct partner ids participating on the selected side(s) of the
  /// given relations, sorted. Missing relation ids are ignored.
  fn participants<'a>(
    &'a self,
    relation_ids: &'a [Uuid],
    side: SideSelector,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + 'a;
}
