//! The bidirectional relation view.
//!
//! Every stored [`Relation`] surfaces twice — once as stored, once
//! inverted — so callers never special-case direction. The inverse row is
//! never stored; both rows are a pure projection of the single underlying
//! record, and writes through the view translate back onto it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  partner::Side,
  relation::{NewRelation, Relation, RelationFields},
  selection::{Direction, SelectionId},
};

// ─── ViewId ──────────────────────────────────────────────────────────────────

/// Identity of a view row: the underlying relation id tagged with a
/// direction. Encoded as `"<relation-uuid>.f"` / `"<relation-uuid>.i"`;
/// both mappings are computable without a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ViewId {
  pub relation_id: Uuid,
  pub direction:   Direction,
}

impl ViewId {
  pub fn new(relation_id: Uuid, direction: Direction) -> Self {
    Self { relation_id, direction }
  }
}

impl std::fmt::Display for ViewId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}.{}", self.relation_id.hyphenated(), self.direction.flag())
  }
}

impl std::str::FromStr for ViewId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let bad = || Error::UnresolvableViewId(s.to_owned());
    let (uuid_part, flag_part) = s.rsplit_once('.').ok_or_else(bad)?;
    let relation_id = Uuid::parse_str(uuid_part).map_err(|_| bad())?;
    let mut flags = flag_part.chars();
    let direction = flags
      .next()
      .filter(|_| flags.next().is_none())
      .and_then(Direction::from_flag)
      .ok_or_else(bad)?;
    Ok(Self { relation_id, direction })
  }
}

impl TryFrom<String> for ViewId {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<ViewId> for String {
  fn from(id: ViewId) -> String { id.to_string() }
}

// ─── Projection ──────────────────────────────────────────────────────────────

/// One orientation of a stored relation. Derived on read, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationViewRow {
  pub view_id:          ViewId,
  pub relation_id:      Uuid,
  pub this_partner_id:  Uuid,
  pub other_partner_id: Uuid,
  pub type_id:          Uuid,
  pub selection_id:     SelectionId,
  pub direction:        Direction,
  pub date_start:       Option<NaiveDate>,
  pub date_end:         Option<NaiveDate>,
  pub active:           bool,
}

/// Project a stored relation into one orientation.
///
/// `is_symmetric` is the flag of the relation's type: a symmetric type has
/// only a forward selection entry, so its inverted row still points at that
/// one.
pub fn project_one(
  relation: &Relation,
  direction: Direction,
  is_symmetric: bool,
) -> RelationViewRow {
  let (this, other) = match direction {
    Direction::Forward => (relation.left_partner_id, relation.right_partner_id),
    Direction::Inverse => (relation.right_partner_id, relation.left_partner_id),
  };
  let selection_direction =
    if is_symmetric { Direction::Forward } else { direction };
  RelationViewRow {
    view_id:          ViewId::new(relation.relation_id, direction),
    relation_id:      relation.relation_id,
    this_partner_id:  this,
    other_partner_id: other,
    type_id:          relation.type_id,
    selection_id:     SelectionId::new(relation.type_id, selection_direction),
    direction,
    date_start:       relation.date_start,
    date_end:         relation.date_end,
    active:           relation.active,
  }
}

/// Project a stored relation into both orientations, forward first.
pub fn project(relation: &Relation, is_symmetric: bool) -> [RelationViewRow; 2] {
  [
    project_one(relation, Direction::Forward, is_symmetric),
    project_one(relation, Direction::Inverse, is_symmetric),
  ]
}

// ─── Write translation ───────────────────────────────────────────────────────

/// Input to a create issued through the view: this/other partners plus the
/// directed selection the user picked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewViewRelation {
  /// May be omitted; falls back to the contextual partner of the call.
  pub this_partner_id:  Option<Uuid>,
  pub other_partner_id: Uuid,
  pub selection_id:     SelectionId,
  pub date_start:       Option<NaiveDate>,
  pub date_end:         Option<NaiveDate>,
  #[serde(default = "default_active")]
  pub active:           bool,
}

fn default_active() -> bool { true }

impl NewViewRelation {
  /// Translate to a create on the underlying relation. Under the inverse
  /// direction, this/other become right/left.
  ///
  /// Returns the direction alongside so the caller can hand back the view
  /// row matching the orientation the user worked in.
  pub fn into_new_relation(
    self,
    default_this: Option<Uuid>,
  ) -> Result<(NewRelation, Direction)> {
    let direction = self.selection_id.direction;
    let this_side = match direction {
      Direction::Forward => Side::Left,
      Direction::Inverse => Side::Right,
    };
    let this = self
      .this_partner_id
      .or(default_this)
      .ok_or(Error::MissingPartner(this_side))?;
    let (left, right) = match direction {
      Direction::Forward => (this, self.other_partner_id),
      Direction::Inverse => (self.other_partner_id, this),
    };
    let relation = NewRelation {
      left_partner_id:  Some(left),
      right_partner_id: right,
      type_id:          self.selection_id.type_id,
      date_start:       self.date_start,
      date_end:         self.date_end,
      active:           self.active,
    };
    Ok((relation, direction))
  }
}

/// The editable fields of a view row — exactly the stored-relation fields,
/// keyed by this/other. Nothing else on a view row is independently
/// editable; unknown keys are rejected at the serde boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewRelationFields {
  pub this_partner_id:  Uuid,
  pub other_partner_id: Uuid,
  pub selection_id:     SelectionId,
  pub date_start:       Option<NaiveDate>,
  pub date_end:         Option<NaiveDate>,
  #[serde(default = "default_active")]
  pub active:           bool,
}

impl ViewRelationFields {
  /// Translate to a whole-field replacement on the underlying relation,
  /// honoring the direction of the (possibly changed) selection.
  pub fn into_relation_fields(self) -> (RelationFields, Direction) {
    let direction = self.selection_id.direction;
    let (left, right) = match direction {
      Direction::Forward => (self.this_partner_id, self.other_partner_id),
      Direction::Inverse => (self.other_partner_id, self.this_partner_id),
    };
    let fields = RelationFields {
      left_partner_id:  left,
      right_partner_id: right,
      type_id:          self.selection_id.type_id,
      date_start:       self.date_start,
      date_end:         self.date_end,
      active:           self.active,
    };
    (fields, direction)
  }
}
