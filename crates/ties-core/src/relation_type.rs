//! Relation types — the catalog of relation classes between partners.
//!
//! A type carries a forward and an inverse display name ("employs" /
//! "works for") plus per-side kind and category constraints. Symmetric
//! types force both sides identical; the propagation happens when the
//! fields are edited, not as a live constraint afterwards.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::partner::PartnerKind;

/// A catalog entry describing a class of relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationType {
  pub type_id:            Uuid,
  pub name:               String,
  pub name_inverse:       String,
  /// Required kind for the left partner; `None` = unrestricted.
  pub contact_kind_left:  Option<PartnerKind>,
  pub contact_kind_right: Option<PartnerKind>,
  /// Category the left partner must carry; `None` = unrestricted.
  pub category_left:      Option<String>,
  pub category_right:     Option<String>,
  /// Whether a partner may be related to itself with this type.
  pub allow_self:         bool,
  pub is_symmetric:       bool,
}

impl RelationType {
  pub fn new(type_id: Uuid, fields: RelationTypeFields) -> Self {
    Self {
      type_id,
      name: fields.name,
      name_inverse: fields.name_inverse,
      contact_kind_left: fields.contact_kind_left,
      contact_kind_right: fields.contact_kind_right,
      category_left: fields.category_left,
      category_right: fields.category_right,
      allow_self: fields.allow_self,
      is_symmetric: fields.is_symmetric,
    }
  }

  /// Restriction applying to the given side.
  pub fn contact_kind(&self, side: crate::partner::Side) -> Option<PartnerKind> {
    match side {
      crate::partner::Side::Left => self.contact_kind_left,
      crate::partner::Side::Right => self.contact_kind_right,
    }
  }
}

/// The editable fields of a [`RelationType`] — used for create and for
/// whole-field replacement on update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationTypeFields {
  pub name:               String,
  pub name_inverse:       String,
  pub contact_kind_left:  Option<PartnerKind>,
  pub contact_kind_right: Option<PartnerKind>,
  pub category_left:      Option<String>,
  pub category_right:     Option<String>,
  #[serde(default)]
  pub allow_self:         bool,
  #[serde(default)]
  pub is_symmetric:       bool,
}

impl RelationTypeFields {
  /// Set right side to left side if symmetric.
  ///
  /// One-way propagation at edit time: a later edit touching only the left
  /// side must go through here again to re-sync the right side.
  pub fn propagate_symmetry(&mut self) {
    if self.is_symmetric {
      self.name_inverse = self.name.clone();
      self.contact_kind_right = self.contact_kind_left;
      self.category_right = self.category_left.clone();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn employs_fields() -> RelationTypeFields {
    RelationTypeFields {
      name:               "employs".into(),
      name_inverse:       "works for".into(),
      contact_kind_left:  Some(PartnerKind::Organisation),
      contact_kind_right: Some(PartnerKind::Individual),
      category_left:      Some("staffing".into()),
      category_right:     None,
      allow_self:         false,
      is_symmetric:       false,
    }
  }

  #[test]
  fn symmetric_propagation_copies_left_to_right() {
    let mut fields = employs_fields();
    fields.is_symmetric = true;
    fields.propagate_symmetry();

    assert_eq!(fields.name_inverse, "employs");
    assert_eq!(fields.contact_kind_right, Some(PartnerKind::Organisation));
    assert_eq!(fields.category_right.as_deref(), Some("staffing"));
  }

  #[test]
  fn asymmetric_fields_untouched_by_propagation() {
    let mut fields = employs_fields();
    fields.propagate_symmetry();

    assert_eq!(fields.name_inverse, "works for");
    assert_eq!(fields.contact_kind_right, Some(PartnerKind::Individual));
    assert_eq!(fields.category_right, None);
  }
}
