//! [`SqliteStore`] — the SQLite implementation of [`RelationStore`].
//!
//! Validation is read-then-write: the partner, type, and overlap-candidate
//! rows are fetched first, the pure invariant checks from `ties-core` run
//! in order, and only then does the single write statement execute. Two
//! concurrent writers can therefore both pass the overlap check; that race
//! is bounded by SQLite's isolation, as in the original design.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use ties_core::{
  partner::{Partner, SideSelector},
  relation::{self, NewRelation, Relation, RelationFields},
  relation_type::{RelationType, RelationTypeFields},
  selection::{TypeSelection, derive_selections},
  store::{RelationQuery, RelationStore, ViewQuery},
  view::{
    self, NewViewRelation, RelationViewRow, ViewId, ViewRelationFields,
  },
};

use crate::{
  Error, Result,
  encode::{
    RawPartner, RawRelation, RawRelationType, encode_categories, encode_date,
    encode_partner_kind, encode_uuid,
  },
  schema::SCHEMA,
};

const RELATION_COLUMNS: &str = "relation_id, left_partner_id, \
   right_partner_id, type_id, date_start, date_end, active";

const TYPE_COLUMNS: &str = "type_id, name, name_inverse, contact_kind_left, \
   contact_kind_right, category_left, category_right, allow_self, \
   is_symmetric";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A partner-relation store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Lookup helpers ────────────────────────────────────────────────────────

  async fn require_partner(&self, id: Uuid) -> Result<Partner> {
    self
      .get_partner(id)
      .await?
      .ok_or(Error::Core(ties_core::Error::PartnerNotFound(id)))
  }

  async fn require_type(&self, id: Uuid) -> Result<RelationType> {
    self
      .get_relation_type(id)
      .await?
      .ok_or(Error::Core(ties_core::Error::TypeNotFound(id)))
  }

  async fn require_relation(&self, id: Uuid) -> Result<Relation> {
    self
      .get_relation(id)
      .await?
      .ok_or(Error::Core(ties_core::Error::RelationNotFound(id)))
  }

  /// Date windows of the *other* active relations sharing the same
  /// `(type, left, right)` triple — the candidate set for the overlap
  /// invariant.
  async fn overlap_candidates(
    &self,
    fields: &RelationFields,
    exclude: Option<Uuid>,
  ) -> Result<Vec<(Option<NaiveDate>, Option<NaiveDate>)>> {
    let type_str = encode_uuid(fields.type_id);
    let left_str = encode_uuid(fields.left_partner_id);
    let right_str = encode_uuid(fields.right_partner_id);
    let exclude_str = exclude.map(encode_uuid);

    let raw: Vec<(Option<String>, Option<String>)> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(exclude) = exclude_str {
          let mut stmt = conn.prepare(
            "SELECT date_start, date_end FROM relations
             WHERE type_id = ?1 AND left_partner_id = ?2
               AND right_partner_id = ?3 AND active = 1
               AND relation_id != ?4",
          )?;
          stmt
            .query_map(
              rusqlite::params![type_str, left_str, right_str, exclude],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT date_start, date_end FROM relations
             WHERE type_id = ?1 AND left_partner_id = ?2
               AND right_partner_id = ?3 AND active = 1",
          )?;
          stmt
            .query_map(
              rusqlite::params![type_str, left_str, right_str],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raw
      .into_iter()
      .map(|(s, e)| {
        Ok((
          s.as_deref().map(crate::encode::decode_date).transpose()?,
          e.as_deref().map(crate::encode::decode_date).transpose()?,
        ))
      })
      .collect()
  }

  /// Run the four invariants against the current store contents.
  /// `exclude` is the relation being updated, exempt from its own overlap
  /// check.
  async fn validate_relation(
    &self,
    fields: &RelationFields,
    exclude: Option<Uuid>,
  ) -> Result<()> {
    let rtype = self.require_type(fields.type_id).await?;
    let left = self.require_partner(fields.left_partner_id).await?;
    let right = self.require_partner(fields.right_partner_id).await?;
    let candidates = self.overlap_candidates(fields, exclude).await?;

    relation::validate(fields, &left, &right, &rtype, candidates)
      .map_err(Error::Core)
  }

  // ── Write helpers ─────────────────────────────────────────────────────────

  async fn insert_relation(&self, relation: &Relation) -> Result<()> {
    let id_str = encode_uuid(relation.relation_id);
    let left_str = encode_uuid(relation.left_partner_id);
    let right_str = encode_uuid(relation.right_partner_id);
    let type_str = encode_uuid(relation.type_id);
    let start_str = relation.date_start.map(encode_date);
    let end_str = relation.date_end.map(encode_date);
    let active = relation.active;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO relations (
             relation_id, left_partner_id, right_partner_id, type_id,
             date_start, date_end, active
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, left_str, right_str, type_str, start_str, end_str, active,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn write_type(&self, rtype: &RelationType, update: bool) -> Result<()> {
    let id_str = encode_uuid(rtype.type_id);
    let name = rtype.name.clone();
    let name_inverse = rtype.name_inverse.clone();
    let kind_left = rtype.contact_kind_left.map(encode_partner_kind);
    let kind_right = rtype.contact_kind_right.map(encode_partner_kind);
    let cat_left = rtype.category_left.clone();
    let cat_right = rtype.category_right.clone();
    let allow_self = rtype.allow_self;
    let is_symmetric = rtype.is_symmetric;

    self
      .conn
      .call(move |conn| {
        if update {
          conn.execute(
            "UPDATE relation_types SET
               name = ?2, name_inverse = ?3, contact_kind_left = ?4,
               contact_kind_right = ?5, category_left = ?6,
               category_right = ?7, allow_self = ?8, is_symmetric = ?9
             WHERE type_id = ?1",
            rusqlite::params![
              id_str, name, name_inverse, kind_left, kind_right, cat_left,
              cat_right, allow_self, is_symmetric,
            ],
          )?;
        } else {
          conn.execute(
            "INSERT INTO relation_types (
               type_id, name, name_inverse, contact_kind_left,
               contact_kind_right, category_left, category_right,
               allow_self, is_symmetric
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
              id_str, name, name_inverse, kind_left, kind_right, cat_left,
              cat_right, allow_self, is_symmetric,
            ],
          )?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RelationStore impl ──────────────────────────────────────────────────────

impl RelationStore for SqliteStore {
  type Error = Error;

  // ── Partners ──────────────────────────────────────────────────────────────

  async fn upsert_partner(&self, partner: Partner) -> Result<Partner> {
    let id_str = encode_uuid(partner.partner_id);
    let kind_str = encode_partner_kind(partner.kind).to_owned();
    let categories_str = encode_categories(&partner.categories)?;

    self
      .conn
      .call(move |conn| {
        // A plain INSERT OR REPLACE deletes the old row first, which would
        // cascade into relations. ON CONFLICT updates in place instead.
        conn.execute(
          "INSERT INTO partners (partner_id, kind, categories)
           VALUES (?1, ?2, ?3)
           ON CONFLICT(partner_id) DO UPDATE SET
             kind = excluded.kind, categories = excluded.categories",
          rusqlite::params![id_str, kind_str, categories_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(partner)
  }

  async fn get_partner(&self, id: Uuid) -> Result<Option<Partner>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPartner> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT partner_id, kind, categories FROM partners
               WHERE partner_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawPartner {
                  partner_id: row.get(0)?,
                  kind:       row.get(1)?,
                  categories: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPartner::into_partner).transpose()
  }

  async fn list_partners(&self) -> Result<Vec<Partner>> {
    let raws: Vec<RawPartner> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT partner_id, kind, categories FROM partners
           ORDER BY partner_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawPartner {
              partner_id: row.get(0)?,
              kind:       row.get(1)?,
              categories: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPartner::into_partner).collect()
  }

  // ── Relation types ────────────────────────────────────────────────────────

  async fn create_relation_type(
    &self,
    mut fields: RelationTypeFields,
  ) -> Result<RelationType> {
    fields.propagate_symmetry();
    let rtype = RelationType::new(Uuid::new_v4(), fields);
    self.write_type(&rtype, false).await?;
    Ok(rtype)
  }

  async fn update_relation_type(
    &self,
    id: Uuid,
    mut fields: RelationTypeFields,
  ) -> Result<RelationType> {
    self.require_type(id).await?;
    fields.propagate_symmetry();
    let rtype = RelationType::new(id, fields);
    self.write_type(&rtype, true).await?;
    Ok(rtype)
  }

  async fn get_relation_type(&self, id: Uuid) -> Result<Option<RelationType>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawRelationType> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {TYPE_COLUMNS} FROM relation_types WHERE type_id = ?1"
              ),
              rusqlite::params![id_str],
              |row| {
                Ok(RawRelationType {
                  type_id:            row.get(0)?,
                  name:               row.get(1)?,
                  name_inverse:       row.get(2)?,
                  contact_kind_left:  row.get(3)?,
                  contact_kind_right: row.get(4)?,
                  category_left:      row.get(5)?,
                  category_right:     row.get(6)?,
                  allow_self:         row.get(7)?,
                  is_symmetric:       row.get(8)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRelationType::into_relation_type).transpose()
  }

  async fn list_relation_types(&self) -> Result<Vec<RelationType>> {
    let raws: Vec<RawRelationType> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TYPE_COLUMNS} FROM relation_types ORDER BY name"
        ))?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawRelationType {
              type_id:            row.get(0)?,
              name:               row.get(1)?,
              name_inverse:       row.get(2)?,
              contact_kind_left:  row.get(3)?,
              contact_kind_right: row.get(4)?,
              category_left:      row.get(5)?,
              category_right:     row.get(6)?,
              allow_self:         row.get(7)?,
              is_symmetric:       row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawRelationType::into_relation_type)
      .collect()
  }

  async fn list_selections(&self) -> Result<Vec<TypeSelection>> {
    let types = self.list_relation_types().await?;
    Ok(derive_selections(&types))
  }

  // ── Relations ─────────────────────────────────────────────────────────────

  async fn create_relation(
    &self,
    input: NewRelation,
    default_left: Option<Uuid>,
  ) -> Result<Relation> {
    let fields = input.resolve(default_left).map_err(Error::Core)?;
    self.validate_relation(&fields, None).await?;

    let relation = fields.into_relation(Uuid::new_v4());
    self.insert_relation(&relation).await?;
    Ok(relation)
  }

  async fn update_relation(
    &self,
    id: Uuid,
    fields: RelationFields,
  ) -> Result<Relation> {
    self.require_relation(id).await?;
    self.validate_relation(&fields, Some(id)).await?;

    let relation = fields.into_relation(id);

    let id_str = encode_uuid(relation.relation_id);
    let left_str = encode_uuid(relation.left_partner_id);
    let right_str = encode_uuid(relation.right_partner_id);
    let type_str = encode_uuid(relation.type_id);
    let start_str = relation.date_start.map(encode_date);
    let end_str = relation.date_end.map(encode_date);
    let active = relation.active;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE relations SET
             left_partner_id = ?2, right_partner_id = ?3, type_id = ?4,
             date_start = ?5, date_end = ?6, active = ?7
           WHERE relation_id = ?1",
          rusqlite::params![
            id_str, left_str, right_str, type_str, start_str, end_str, active,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(relation)
  }

  async fn delete_relation(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM relations WHERE relation_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::Core(ties_core::Error::RelationNotFound(id)));
    }
    Ok(())
  }

  async fn get_relation(&self, id: Uuid) -> Result<Option<Relation>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawRelation> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {RELATION_COLUMNS} FROM relations
                 WHERE relation_id = ?1"
              ),
              rusqlite::params![id_str],
              |row| {
                Ok(RawRelation {
                  relation_id:      row.get(0)?,
                  left_partner_id:  row.get(1)?,
                  right_partner_id: row.get(2)?,
                  type_id:          row.get(3)?,
                  date_start:       row.get(4)?,
                  date_end:         row.get(5)?,
                  active:           row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRelation::into_relation).transpose()
  }

  async fn list_relations<'a>(
    &'a self,
    query: &'a RelationQuery,
  ) -> Result<Vec<Relation>> {
    let type_str = query.type_id.map(encode_uuid);
    let left_str = query.left_partner_id.map(encode_uuid);
    let right_str = query.right_partner_id.map(encode_uuid);
    let either_str = query.partner_id.map(encode_uuid);
    let date_str = query.active_at.map(encode_date);
    let active_only = query.active_only;
    let limit_val = query.limit.map(|l| l as i64).unwrap_or(-1);
    let offset_val = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawRelation> = self
      .conn
      .call(move |conn| {
        // Fixed parameter numbering; the WHERE clause only references the
        // placeholders whose filter is set. ISO dates compare correctly as
        // strings.
        let mut conds: Vec<&'static str> = vec![];
        if type_str.is_some() {
          conds.push("type_id = ?1");
        }
        if left_str.is_some() {
          conds.push("left_partner_id = ?2");
        }
        if right_str.is_some() {
          conds.push("right_partner_id = ?3");
        }
        if either_str.is_some() {
          conds.push("(left_partner_id = ?4 OR right_partner_id = ?4)");
        }
        if date_str.is_some() {
          conds.push("(date_start IS NULL OR date_start <= ?5)");
          conds.push("(date_end IS NULL OR date_end >= ?5)");
        }
        if active_only {
          conds.push("active = 1");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {RELATION_COLUMNS} FROM relations
           {where_clause}
           ORDER BY relation_id
           LIMIT ?6 OFFSET ?7"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              type_str.as_deref(),
              left_str.as_deref(),
              right_str.as_deref(),
              either_str.as_deref(),
              date_str.as_deref(),
              limit_val,
              offset_val,
            ],
            |row| {
              Ok(RawRelation {
                relation_id:      row.get(0)?,
                left_partner_id:  row.get(1)?,
                right_partner_id: row.get(2)?,
                type_id:          row.get(3)?,
                date_start:       row.get(4)?,
                date_end:         row.get(5)?,
                active:           row.get(6)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRelation::into_relation).collect()
  }

  // ── Bidirectional view ────────────────────────────────────────────────────

  async fn list_view<'a>(
    &'a self,
    query: &'a ViewQuery,
  ) -> Result<Vec<RelationViewRow>> {
    // Filter the underlying relations by what translates directly, project,
    // then filter per-row; limit/offset apply to view rows, not relations.
    let relation_query = RelationQuery {
      type_id: query
        .type_id
        .or(query.selection_id.map(|s| s.type_id)),
      active_only: query.active_only,
      active_at: query.active_at,
      ..Default::default()
    };
    let relations = self.list_relations(&relation_query).await?;
    let types = self.list_relation_types().await?;
    let symmetric =
      |type_id: Uuid| types.iter().any(|t| t.type_id == type_id && t.is_symmetric);

    let mut rows: Vec<RelationViewRow> = relations
      .iter()
      .flat_map(|r| view::project(r, symmetric(r.type_id)))
      .collect();

    if let Some(this) = query.this_partner_id {
      rows.retain(|row| row.this_partner_id == this);
    }
    if let Some(other) = query.other_partner_id {
      rows.retain(|row| row.other_partner_id == other);
    }
    if let Some(selection) = query.selection_id {
      rows.retain(|row| row.selection_id == selection);
    }

    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(usize::MAX);
    Ok(rows.into_iter().skip(offset).take(limit).collect())
  }

  async fn get_view_row(&self, id: ViewId) -> Result<Option<RelationViewRow>> {
    let Some(relation) = self.get_relation(id.relation_id).await? else {
      return Ok(None);
    };
    let rtype = self.require_type(relation.type_id).await?;
    Ok(Some(view::project_one(
      &relation,
      id.direction,
      rtype.is_symmetric,
    )))
  }

  async fn create_via_view(
    &self,
    input: NewViewRelation,
    default_this: Option<Uuid>,
  ) -> Result<RelationViewRow> {
    // Resolve the selection before translating so a dangling id fails as
    // such, not as a missing type.
    let selection_id = input.selection_id;
    let rtype = self
      .get_relation_type(selection_id.type_id)
      .await?
      .ok_or_else(|| {
        Error::Core(ties_core::Error::UnknownTypeSelection(
          selection_id.to_string(),
        ))
      })?;
    rtype.resolve_selection(selection_id).map_err(Error::Core)?;

    let (new_relation, direction) =
      input.into_new_relation(default_this).map_err(Error::Core)?;
    let relation = self.create_relation(new_relation, None).await?;
    Ok(view::project_one(&relation, direction, rtype.is_symmetric))
  }

  async fn update_via_view(
    &self,
    id: ViewId,
    fields: ViewRelationFields,
  ) -> Result<RelationViewRow> {
    let selection_id = fields.selection_id;
    let rtype = self
      .get_relation_type(selection_id.type_id)
      .await?
      .ok_or_else(|| {
        Error::Core(ties_core::Error::UnknownTypeSelection(
          selection_id.to_string(),
        ))
      })?;
    rtype.resolve_selection(selection_id).map_err(Error::Core)?;

    let (relation_fields, direction) = fields.into_relation_fields();
    let relation = self.update_relation(id.relation_id, relation_fields).await?;
    Ok(view::project_one(&relation, direction, rtype.is_symmetric))
  }

  async fn delete_via_view(&self, id: ViewId) -> Result<()> {
    // Either orientation deletes the one underlying relation.
    self.delete_relation(id.relation_id).await
  }

  // ── Participants ──────────────────────────────────────────────────────────

  async fn participants<'a>(
    &'a self,
    relation_ids: &'a [Uuid],
    side: SideSelector,
  ) -> Result<Vec<Uuid>> {
    if relation_ids.is_empty() {
      return Ok(Vec::new());
    }

    let id_strs: Vec<String> =
      relation_ids.iter().copied().map(encode_uuid).collect();

    let raw: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let placeholders =
          vec!["?"; id_strs.len()].join(", ");
        let sql = format!(
          "SELECT left_partner_id, right_partner_id FROM relations
           WHERE relation_id IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(id_strs.iter()), |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut ids = Vec::new();
    for (left, right) in raw {
      match side {
        SideSelector::Left => ids.push(crate::encode::decode_uuid(&left)?),
        SideSelector::Right => ids.push(crate::encode::decode_uuid(&right)?),
        SideSelector::All => {
          ids.push(crate::encode::decode_uuid(&left)?);
          ids.push(crate::encode::decode_uuid(&right)?);
        }
      }
    }
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
  }
}
