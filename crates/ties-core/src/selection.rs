//! Type selections — the flattened `(type, direction)` catalog.
//!
//! A selection is what a user actually picks when linking two partners:
//! "employs" and "works for" are two selections over the one stored type.
//! Selections are derived from the type catalog on every read and are never
//! stored, so they can not drift from it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  partner::{Partner, PartnerFilter, PartnerKind},
  relation_type::RelationType,
};

// ─── Direction ───────────────────────────────────────────────────────────────

/// Orientation of a selection or view row relative to the stored relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  /// This side is the stored left partner.
  Forward,
  /// This side is the stored right partner.
  Inverse,
}

impl Direction {
  /// Single-character tag used in encoded selection and view ids.
  pub fn flag(self) -> char {
    match self {
      Self::Forward => 'f',
      Self::Inverse => 'i',
    }
  }

  pub fn from_flag(c: char) -> Option<Self> {
    match c {
      'f' => Some(Self::Forward),
      'i' => Some(Self::Inverse),
      _ => None,
    }
  }
}

// ─── SelectionId ─────────────────────────────────────────────────────────────

/// Identity of a selection: the underlying type id tagged with a direction.
///
/// Encoded as `"<type-uuid>.f"` / `"<type-uuid>.i"`, so the reverse mapping
/// needs no lookup. The original integer scheme (`type_id * 10 + flag`)
/// does not carry over to uuid keys; the tagged pair is the equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SelectionId {
  pub type_id:   Uuid,
  pub direction: Direction,
}

impl SelectionId {
  pub fn new(type_id: Uuid, direction: Direction) -> Self {
    Self { type_id, direction }
  }
}

impl std::fmt::Display for SelectionId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}.{}", self.type_id.hyphenated(), self.direction.flag())
  }
}

impl std::str::FromStr for SelectionId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let bad = || Error::UnknownTypeSelection(s.to_owned());
    let (uuid_part, flag_part) = s.rsplit_once('.').ok_or_else(bad)?;
    let type_id = Uuid::parse_str(uuid_part).map_err(|_| bad())?;
    let mut flags = flag_part.chars();
    let direction = flags
      .next()
      .filter(|_| flags.next().is_none())
      .and_then(Direction::from_flag)
      .ok_or_else(bad)?;
    Ok(Self { type_id, direction })
  }
}

impl TryFrom<String> for SelectionId {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<SelectionId> for String {
  fn from(id: SelectionId) -> String { id.to_string() }
}

// ─── TypeSelection ───────────────────────────────────────────────────────────

/// One directed catalog entry, with the type's side constraints re-keyed to
/// "this side" / "other side" under the entry's direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSelection {
  pub selection_id:       SelectionId,
  pub type_id:            Uuid,
  pub direction:          Direction,
  /// Label shown to the user: `name` forward, `name_inverse` inverse.
  pub label:              String,
  pub contact_kind_this:  Option<PartnerKind>,
  pub contact_kind_other: Option<PartnerKind>,
  pub category_this:      Option<String>,
  pub category_other:     Option<String>,
  pub allow_self:         bool,
  pub is_symmetric:       bool,
}

impl RelationType {
  /// The selection for this type under `direction`, or `None` when the
  /// direction does not exist (inverse of a symmetric type).
  pub fn selection(&self, direction: Direction) -> Option<TypeSelection> {
    if self.is_symmetric && direction == Direction::Inverse {
      return None;
    }
    let (label, kind_this, kind_other, cat_this, cat_other) = match direction {
      Direction::Forward => (
        self.name.clone(),
        self.contact_kind_left,
        self.contact_kind_right,
        self.category_left.clone(),
        self.category_right.clone(),
      ),
      Direction::Inverse => (
        self.name_inverse.clone(),
        self.contact_kind_right,
        self.contact_kind_left,
        self.category_right.clone(),
        self.category_left.clone(),
      ),
    };
    Some(TypeSelection {
      selection_id:       SelectionId::new(self.type_id, direction),
      type_id:            self.type_id,
      direction,
      label,
      contact_kind_this:  kind_this,
      contact_kind_other: kind_other,
      category_this:      cat_this,
      category_other:     cat_other,
      allow_self:         self.allow_self,
      is_symmetric:       self.is_symmetric,
    })
  }

  /// Resolve a selection id against this type, failing when the id does
  /// not denote an existing directed entry.
  pub fn resolve_selection(&self, id: SelectionId) -> Result<TypeSelection> {
    if id.type_id != self.type_id {
      return Err(Error::UnknownTypeSelection(id.to_string()));
    }
    self
      .selection(id.direction)
      .ok_or_else(|| Error::UnknownTypeSelection(id.to_string()))
  }
}

/// Derive the full selection catalog: one forward entry per type, plus an
/// inverse entry for each non-symmetric type. Pure and deterministic over
/// its input.
pub fn derive_selections(types: &[RelationType]) -> Vec<TypeSelection> {
  types
    .iter()
    .flat_map(|t| {
      t.selection(Direction::Forward)
        .into_iter()
        .chain(t.selection(Direction::Inverse))
    })
    .collect()
}

// ─── UI-assist callbacks ─────────────────────────────────────────────────────

/// Allowed-value filter for the *other* partner once a selection is picked.
/// Pure; no persistence effect.
pub fn other_partner_filter(selection: &TypeSelection) -> PartnerFilter {
  PartnerFilter {
    kind:     selection.contact_kind_other,
    category: selection.category_other.clone(),
  }
}

/// The selections whose this-side constraints admit `partner` — used to
/// narrow the selection list once the current partner is known. Pure; no
/// persistence effect.
pub fn selections_for_partner(
  partner: &Partner,
  selections: &[TypeSelection],
) -> Vec<TypeSelection> {
  selections
    .iter()
    .filter(|s| {
      let filter = PartnerFilter {
        kind:     s.contact_kind_this,
        category: s.category_this.clone(),
      };
      filter.admits(partner)
    })
    .cloned()
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::relation_type::RelationTypeFields;

  fn employs_type() -> RelationType {
    RelationType::new(Uuid::new_v4(), RelationTypeFields {
      name:               "employs".into(),
      name_inverse:       "works for".into(),
      contact_kind_left:  Some(PartnerKind::Organisation),
      contact_kind_right: Some(PartnerKind::Individual),
      category_left:      Some("company".into()),
      category_right:     None,
      allow_self:         false,
      is_symmetric:       false,
    })
  }

  fn partner_of_type() -> RelationType {
    let mut fields = RelationTypeFields {
      name:               "business partner of".into(),
      name_inverse:       String::new(),
      contact_kind_left:  Some(PartnerKind::Organisation),
      contact_kind_right: None,
      category_left:      None,
      category_right:     None,
      allow_self:         false,
      is_symmetric:       true,
    };
    fields.propagate_symmetry();
    RelationType::new(Uuid::new_v4(), fields)
  }

  #[test]
  fn asymmetric_type_yields_two_swapped_entries() {
    let t = employs_type();
    let selections = derive_selections(std::slice::from_ref(&t));
    assert_eq!(selections.len(), 2);

    let forward = &selections[0];
    assert_eq!(forward.direction, Direction::Forward);
    assert_eq!(forward.label, "employs");
    assert_eq!(forward.contact_kind_this, Some(PartnerKind::Organisation));
    assert_eq!(forward.contact_kind_other, Some(PartnerKind::Individual));
    assert_eq!(forward.category_this.as_deref(), Some("company"));
    assert_eq!(forward.category_other, None);

    let inverse = &selections[1];
    assert_eq!(inverse.direction, Direction::Inverse);
    assert_eq!(inverse.label, "works for");
    assert_eq!(inverse.contact_kind_this, Some(PartnerKind::Individual));
    assert_eq!(inverse.contact_kind_other, Some(PartnerKind::Organisation));
    assert_eq!(inverse.category_this, None);
    assert_eq!(inverse.category_other.as_deref(), Some("company"));
  }

  #[test]
  fn symmetric_type_yields_single_entry() {
    let t = partner_of_type();
    let selections = derive_selections(std::slice::from_ref(&t));
    assert_eq!(selections.len(), 1);
    assert_eq!(selections[0].direction, Direction::Forward);
    assert_eq!(selections[0].label, "business partner of");
  }

  #[test]
  fn derivation_is_deterministic() {
    let types = vec![employs_type(), partner_of_type()];
    assert_eq!(derive_selections(&types), derive_selections(&types));
  }

  #[test]
  fn selection_id_round_trips() {
    let id = SelectionId::new(Uuid::new_v4(), Direction::Inverse);
    let parsed: SelectionId = id.to_string().parse().unwrap();
    assert_eq!(parsed, id);
  }

  #[test]
  fn selection_ids_usable_as_hash_keys() {
    let type_id = Uuid::new_v4();
    let ids: std::collections::HashSet<SelectionId> = [
      SelectionId::new(type_id, Direction::Forward),
      SelectionId::new(type_id, Direction::Inverse),
      SelectionId::new(type_id, Direction::Forward),
    ]
    .into_iter()
    .collect();
    assert_eq!(ids.len(), 2);
  }

  #[test]
  fn selection_id_rejects_garbage() {
    for bad in ["", "nope", "1234.f", "not-a-uuid.i"] {
      assert!(matches!(
        bad.parse::<SelectionId>(),
        Err(Error::UnknownTypeSelection(_))
      ));
    }
    let no_flag = format!("{}.x", Uuid::new_v4());
    assert!(no_flag.parse::<SelectionId>().is_err());
  }

  #[test]
  fn resolve_selection_rejects_inverse_of_symmetric() {
    let t = partner_of_type();
    let id = SelectionId::new(t.type_id, Direction::Inverse);
    assert!(matches!(
      t.resolve_selection(id),
      Err(Error::UnknownTypeSelection(_))
    ));
  }

  #[test]
  fn assist_filters_follow_direction() {
    let t = employs_type();
    let inverse = t.selection(Direction::Inverse).unwrap();
    let filter = other_partner_filter(&inverse);
    assert_eq!(filter.kind, Some(PartnerKind::Organisation));
    assert_eq!(filter.category.as_deref(), Some("company"));

    let person = Partner {
      partner_id: Uuid::new_v4(),
      kind:       PartnerKind::Individual,
      categories: vec![],
    };
    let selections = derive_selections(std::slice::from_ref(&t));
    let admitted = selections_for_partner(&person, &selections);
    // A person can be the employee ("works for") but never the employer.
    assert_eq!(admitted.len(), 1);
    assert_eq!(admitted[0].direction, Direction::Inverse);
  }
}
