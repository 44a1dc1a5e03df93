//! Error types for `ties-core`.
//!
//! The first five variants are the validation taxonomy: every relation
//! create/update checks its invariants in a fixed order and fails with the
//! first violated one, leaving the store untouched.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::partner::Side;

#[derive(Debug, Error)]
pub enum Error {
  #[error("the starting date {0} cannot be after the ending date {1}")]
  InvalidDateRange(NaiveDate, NaiveDate),

  #[error("the {0} partner is not applicable for this relation type")]
  PartnerKindMismatch(Side),

  #[error("partners cannot have a relation with themselves")]
  SelfRelationNotAllowed,

  #[error("there is already a similar relation with overlapping dates")]
  OverlappingDuplicate,

  #[error("unknown relation type selection: {0:?}")]
  UnknownTypeSelection(String),

  #[error("unresolvable relation view id: {0:?}")]
  UnresolvableViewId(String),

  #[error("no {0} partner given and no contextual partner to default to")]
  MissingPartner(Side),

  #[error("relation type not found: {0}")]
  TypeNotFound(Uuid),

  #[error("relation not found: {0}")]
  RelationNotFound(Uuid),

  #[error("partner not found: {0}")]
  PartnerNotFound(Uuid),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
