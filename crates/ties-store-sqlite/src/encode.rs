//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as ISO 8601 `YYYY-MM-DD` strings, which also makes
//! lexicographic SQL comparison equal to date comparison. Category tags are
//! stored as compact JSON arrays. UUIDs are stored as hyphenated lowercase
//! strings. Booleans are stored as 0/1 integers.

use chrono::NaiveDate;
use ties_core::{
  partner::{Partner, PartnerKind},
  relation::Relation,
  relation_type::RelationType,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse().map_err(|_| Error::DateParse(s.to_owned()))
}

// ─── PartnerKind ─────────────────────────────────────────────────────────────

pub fn encode_partner_kind(k: PartnerKind) -> &'static str {
  match k {
    PartnerKind::Organisation => "organisation",
    PartnerKind::Individual => "individual",
  }
}

pub fn decode_partner_kind(s: &str) -> Result<PartnerKind> {
  match s {
    "organisation" => Ok(PartnerKind::Organisation),
    "individual" => Ok(PartnerKind::Individual),
    other => Err(Error::Decode(format!("unknown partner kind: {other:?}"))),
  }
}

// ─── Categories ──────────────────────────────────────────────────────────────

pub fn encode_categories(categories: &[String]) -> Result<String> {
  Ok(serde_json::to_string(categories)?)
}

pub fn decode_categories(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `partners` row.
pub struct RawPartner {
  pub partner_id: String,
  pub kind:       String,
  pub categories: String,
}

impl RawPartner {
  pub fn into_partner(self) -> Result<Partner> {
    Ok(Partner {
      partner_id: decode_uuid(&self.partner_id)?,
      kind:       decode_partner_kind(&self.kind)?,
      categories: decode_categories(&self.categories)?,
    })
  }
}

/// Raw values read directly from a `relation_types` row.
pub struct RawRelationType {
  pub type_id:            String,
  pub name:               String,
  pub name_inverse:       String,
  pub contact_kind_left:  Option<String>,
  pub contact_kind_right: Option<String>,
  pub category_left:      Option<String>,
  pub category_right:     Option<String>,
  pub allow_self:         bool,
  pub is_symmetric:       bool,
}

impl RawRelationType {
  pub fn into_relation_type(self) -> Result<RelationType> {
    Ok(RelationType {
      type_id:            decode_uuid(&self.type_id)?,
      name:               self.name,
      name_inverse:       self.name_inverse,
      contact_kind_left:  self
        .contact_kind_left
        .as_deref()
        .map(decode_partner_kind)
        .transpose()?,
      contact_kind_right: self
        .contact_kind_right
        .as_deref()
        .map(decode_partner_kind)
        .transpose()?,
      category_left:      self.category_left,
      category_right:     self.category_right,
      allow_self:         self.allow_self,
      is_symmetric:       self.is_symmetric,
    })
  }
}

/// Raw values read directly from a `relations` row.
pub struct RawRelation {
  pub relation_id:      String,
  pub left_partner_id:  String,
  pub right_partner_id: String,
  pub type_id:          String,
  pub date_start:       Option<String>,
  pub date_end:         Option<String>,
  pub active:           bool,
}

impl RawRelation {
  pub fn into_relation(self) -> Result<Relation> {
    Ok(Relation {
      relation_id:      decode_uuid(&self.relation_id)?,
      left_partner_id:  decode_uuid(&self.left_partner_id)?,
      right_partner_id: decode_uuid(&self.right_partner_id)?,
      type_id:          decode_uuid(&self.type_id)?,
      date_start:       self.date_start.as_deref().map(decode_date).transpose()?,
      date_end:         self.date_end.as_deref().map(decode_date).transpose()?,
      active:           self.active,
    })
  }
}
