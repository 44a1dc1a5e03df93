//! Partner — the external contact record this subsystem links together.
//!
//! Partners are owned by the host contact application; the store only keeps
//! a read-only mirror of the fields relation validation needs (organisation
//! vs. individual, category tags). This subsystem never creates partners on
//! its own.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a partner is an organisation or an individual person.
///
/// A relation type restricts a side with `Option<PartnerKind>`; `None`
/// means the side is unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnerKind {
  Organisation,
  Individual,
}

/// Mirror of a host contact record: just the fields validation reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
  pub partner_id: Uuid,
  pub kind:       PartnerKind,
  /// Category tags assigned in the host application.
  pub categories: Vec<String>,
}

impl Partner {
  pub fn in_category(&self, category: &str) -> bool {
    self.categories.iter().any(|c| c == category)
  }
}

// ─── Sides ───────────────────────────────────────────────────────────────────

/// One end of a stored relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
  Left,
  Right,
}

impl std::fmt::Display for Side {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Left => write!(f, "left"),
      Self::Right => write!(f, "right"),
    }
  }
}

/// Side selector for participant queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideSelector {
  Left,
  Right,
  All,
}

// ─── UI-assist filter ────────────────────────────────────────────────────────

/// Allowed-value constraints for a partner picker, produced by the assist
/// callbacks. `None` fields impose no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerFilter {
  pub kind:     Option<PartnerKind>,
  pub category: Option<String>,
}

impl PartnerFilter {
  /// Whether `partner` satisfies both constraints.
  pub fn admits(&self, partner: &Partner) -> bool {
    if let Some(kind) = self.kind
      && partner.kind != kind
    {
      return false;
    }
    if let Some(category) = &self.category
      && !partner.in_category(category)
    {
      return false;
    }
    true
  }
}
