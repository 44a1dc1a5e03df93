//! Relation — the stored, directed edge between two partners.
//!
//! This is the only persisted record; everything the rest of the subsystem
//! shows (selections, the bidirectional view) is derived from it and from
//! the type catalog. The validation invariants live here as pure functions
//! so every storage backend enforces exactly the same rules in the same
//! order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  partner::{Partner, Side},
  relation_type::RelationType,
};

/// A stored relation of a given type between two partners, optionally
/// limited to a validity window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
  pub relation_id:      Uuid,
  pub left_partner_id:  Uuid,
  pub right_partner_id: Uuid,
  pub type_id:          Uuid,
  pub date_start:       Option<NaiveDate>,
  pub date_end:         Option<NaiveDate>,
  /// Inactive relations are exempt from the overlap invariant.
  pub active:           bool,
}

impl Relation {
  pub fn partner_id(&self, side: Side) -> Uuid {
    match side {
      Side::Left => self.left_partner_id,
      Side::Right => self.right_partner_id,
    }
  }
}

/// Input to [`crate::store::RelationStore::create_relation`].
///
/// `left_partner_id` may be omitted; it then falls back to the contextual
/// partner passed alongside the create call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRelation {
  pub left_partner_id:  Option<Uuid>,
  pub right_partner_id: Uuid,
  pub type_id:          Uuid,
  pub date_start:       Option<NaiveDate>,
  pub date_end:         Option<NaiveDate>,
  #[serde(default = "default_active")]
  pub active:           bool,
}

fn default_active() -> bool { true }

impl NewRelation {
  /// Convenience constructor: active, unbounded window.
  pub fn new(left: Uuid, right: Uuid, type_id: Uuid) -> Self {
    Self {
      left_partner_id:  Some(left),
      right_partner_id: right,
      type_id,
      date_start: None,
      date_end: None,
      active: true,
    }
  }

  /// Fill the left partner from the contextual default, or fail.
  pub fn resolve(self, default_left: Option<Uuid>) -> Result<RelationFields> {
    let left = self
      .left_partner_id
      .or(default_left)
      .ok_or(Error::MissingPartner(Side::Left))?;
    Ok(RelationFields {
      left_partner_id:  left,
      right_partner_id: self.right_partner_id,
      type_id:          self.type_id,
      date_start:       self.date_start,
      date_end:         self.date_end,
      active:           self.active,
    })
  }
}

/// The editable fields of a [`Relation`] — whole-field replacement on
/// update, and the resolved form of a create.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationFields {
  pub left_partner_id:  Uuid,
  pub right_partner_id: Uuid,
  pub type_id:          Uuid,
  pub date_start:       Option<NaiveDate>,
  pub date_end:         Option<NaiveDate>,
  #[serde(default = "default_active")]
  pub active:           bool,
}

impl RelationFields {
  pub fn into_relation(self, relation_id: Uuid) -> Relation {
    Relation {
      relation_id,
      left_partner_id: self.left_partner_id,
      right_partner_id: self.right_partner_id,
      type_id: self.type_id,
      date_start: self.date_start,
      date_end: self.date_end,
      active: self.active,
    }
  }
}

// ─── Date windows ────────────────────────────────────────────────────────────

/// Whether two validity windows overlap. An unset bound is treated as
/// unbounded in that direction.
pub fn windows_overlap(
  s1: Option<NaiveDate>,
  e1: Option<NaiveDate>,
  s2: Option<NaiveDate>,
  e2: Option<NaiveDate>,
) -> bool {
  let starts_before_other_ends =
    |s: Option<NaiveDate>, e: Option<NaiveDate>| match (s, e) {
      (Some(s), Some(e)) => s <= e,
      // Either no lower bound on one window or no upper bound on the other.
      _ => true,
    };
  starts_before_other_ends(s2, e1) && starts_before_other_ends(s1, e2)
}

/// Whether a window contains `date`.
pub fn window_contains(
  start: Option<NaiveDate>,
  end: Option<NaiveDate>,
  date: NaiveDate,
) -> bool {
  start.is_none_or(|s| s <= date) && end.is_none_or(|e| date <= e)
}

// ─── Invariant checks ────────────────────────────────────────────────────────

/// Invariant 1: the window must be well-formed.
pub fn check_date_order(
  start: Option<NaiveDate>,
  end: Option<NaiveDate>,
) -> Result<()> {
  if let (Some(start), Some(end)) = (start, end)
    && start > end
  {
    return Err(Error::InvalidDateRange(start, end));
  }
  Ok(())
}

/// Invariant 2, one side: the partner's kind must satisfy the type's
/// restriction for that side.
pub fn check_partner_kind(
  side: Side,
  partner: &Partner,
  rtype: &RelationType,
) -> Result<()> {
  if let Some(required) = rtype.contact_kind(side)
    && partner.kind != required
  {
    return Err(Error::PartnerKindMismatch(side));
  }
  Ok(())
}

/// Invariant 3: self-relations need the type's explicit permission.
pub fn check_self_relation(
  left: Uuid,
  right: Uuid,
  rtype: &RelationType,
) -> Result<()> {
  if left == right && !rtype.allow_self {
    return Err(Error::SelfRelationNotAllowed);
  }
  Ok(())
}

/// Invariant 4: no active duplicate with an overlapping window.
///
/// `candidates` must already be filtered to *other* active relations
/// sharing the same `(type_id, left, right)` triple; this only applies the
/// window test.
pub fn check_no_overlap(
  start: Option<NaiveDate>,
  end: Option<NaiveDate>,
  candidates: impl IntoIterator<Item = (Option<NaiveDate>, Option<NaiveDate>)>,
) -> Result<()> {
  for (s, e) in candidates {
    if windows_overlap(start, end, s, e) {
      return Err(Error::OverlappingDuplicate);
    }
  }
  Ok(())
}

/// Run all four invariants in order; the first violation wins.
///
/// Callers supply the already-looked-up partner and type rows and the
/// overlap candidate windows, so this stays pure and backend-independent.
pub fn validate(
  fields: &RelationFields,
  left: &Partner,
  right: &Partner,
  rtype: &RelationType,
  overlap_candidates: impl IntoIterator<
    Item = (Option<NaiveDate>, Option<NaiveDate>),
  >,
) -> Result<()> {
  check_date_order(fields.date_start, fields.date_end)?;
  check_partner_kind(Side::Left, left, rtype)?;
  check_partner_kind(Side::Right, right, rtype)?;
  check_self_relation(fields.left_partner_id, fields.right_partner_id, rtype)?;
  if fields.active {
    check_no_overlap(fields.date_start, fields.date_end, overlap_candidates)?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(s: &str) -> NaiveDate { s.parse().unwrap() }

  #[test]
  fn overlap_bounded_windows() {
    // Disjoint.
    assert!(!windows_overlap(
      Some(d("2024-01-01")),
      Some(d("2024-06-30")),
      Some(d("2024-07-01")),
      Some(d("2024-12-31")),
    ));
    // Touching endpoints count as overlap.
    assert!(windows_overlap(
      Some(d("2024-01-01")),
      Some(d("2024-06-30")),
      Some(d("2024-06-30")),
      Some(d("2024-12-31")),
    ));
    // Contained.
    assert!(windows_overlap(
      Some(d("2024-01-01")),
      Some(d("2024-12-31")),
      Some(d("2024-03-01")),
      Some(d("2024-04-01")),
    ));
  }

  #[test]
  fn overlap_open_ended_windows() {
    // Open end overlaps anything starting later.
    assert!(windows_overlap(
      Some(d("2024-05-01")),
      None,
      Some(d("2024-01-01")),
      Some(d("2024-06-30")),
    ));
    // Open end does not reach a window that closed earlier.
    assert!(!windows_overlap(
      Some(d("2024-07-01")),
      None,
      Some(d("2024-01-01")),
      Some(d("2024-06-30")),
    ));
    // Two fully unbounded windows always overlap.
    assert!(windows_overlap(None, None, None, None));
    // Open start vs. open end.
    assert!(windows_overlap(None, Some(d("2024-03-01")), Some(d("2024-02-01")), None));
  }

  #[test]
  fn date_order_rejects_inverted_window() {
    assert!(check_date_order(Some(d("2024-06-30")), Some(d("2024-01-01"))).is_err());
    assert!(check_date_order(Some(d("2024-01-01")), Some(d("2024-01-01"))).is_ok());
    assert!(check_date_order(None, Some(d("2024-01-01"))).is_ok());
    assert!(check_date_order(Some(d("2024-01-01")), None).is_ok());
  }

  #[test]
  fn window_contains_respects_open_bounds() {
    assert!(window_contains(None, None, d("2024-01-01")));
    assert!(window_contains(Some(d("2024-01-01")), None, d("2024-01-01")));
    assert!(!window_contains(Some(d("2024-01-02")), None, d("2024-01-01")));
    assert!(!window_contains(None, Some(d("2023-12-31")), d("2024-01-01")));
  }

  #[test]
  fn resolve_defaults_left_partner() {
    let right = Uuid::new_v4();
    let type_id = Uuid::new_v4();
    let context = Uuid::new_v4();

    let input = NewRelation {
      left_partner_id: None,
      right_partner_id: right,
      type_id,
      date_start: None,
      date_end: None,
      active: true,
    };

    let fields = input.clone().resolve(Some(context)).unwrap();
    assert_eq!(fields.left_partner_id, context);
    assert_eq!(fields.right_partner_id, right);

    let err = input.resolve(None).unwrap_err();
    assert!(matches!(err, Error::MissingPartner(Side::Left)));
  }

  #[test]
  fn explicit_left_partner_wins_over_default() {
    let left = Uuid::new_v4();
    let mut input = NewRelation::new(left, Uuid::new_v4(), Uuid::new_v4());
    input.left_partner_id = Some(left);

    let fields = input.resolve(Some(Uuid::new_v4())).unwrap();
    assert_eq!(fields.left_partner_id, left);
  }
}
