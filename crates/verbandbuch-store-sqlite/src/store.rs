//! [`SqliteStore`]: the SQLite implementation of [`AccidentStore`].

use std::sync::Arc;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use verbandbuch_core::{
  query::AccidentQuery,
  record::{AccidentRecord, DeletedAccident, NewAccident, UpdatedAccident},
  store::AccidentStore,
};

use crate::{
  Error, Result,
  config::StoreConfig,
  encode::{AccidentParams, RawAccident, decode_dt, encode_dt, stored_precision},
  pool::Pool,
  schema::COLUMNS,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An accident store backed by a single SQLite file.
///
/// Cloning is cheap; the connection pool is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pool: Arc<Pool>,
}

impl SqliteStore {
  /// Open (or create) a store as configured and run schema initialisation.
  pub async fn open(config: &StoreConfig) -> Result<Self> {
    let pool = Pool::open(config).await?;
    Ok(Self { pool: Arc::new(pool) })
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> { Self::open(&StoreConfig::in_memory()).await }

  pub fn pool(&self) -> &Pool { &self.pool }

  /// Number of stored records.
  pub async fn count(&self) -> Result<u64> {
    let conn = self.pool.acquire().await?;
    let n: i64 = conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM accidents", [], |r| r.get(0))?))
      .await?;
    Ok(n.max(0) as u64)
  }

  /// Remove every record and restart id assignment at 1.
  pub async fn truncate(&self) -> Result<()> {
    let conn = self.pool.acquire().await?;
    conn
      .call(|conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM accidents", [])?;
        tx.execute("DELETE FROM sqlite_sequence WHERE name = 'accidents'", [])?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── AccidentStore impl ──────────────────────────────────────────────────────

impl AccidentStore for SqliteStore {
  type Error = Error;

  async fn insert(&self, accident: NewAccident) -> Result<AccidentRecord> {
    let created_at = stored_precision(Utc::now())?;
    let p = AccidentParams::from(&accident);
    let at_str = encode_dt(created_at);

    let conn = self.pool.acquire().await?;
    let id: i64 = conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO accidents (
             name_verletzte_person, unfall_datum, unfall_uhrzeit, ort, hergang,
             art_der_verletzung, zeugen, erstehilfe_datum, erstehilfe_uhrzeit,
             erstehilfe_massnahmen, ersthelfer_name, bearbeiter_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
           RETURNING id",
          rusqlite::params![
            p.name_verletzte_person,
            p.unfall_datum,
            p.unfall_uhrzeit,
            p.ort,
            p.hergang,
            p.art_der_verletzung,
            p.zeugen,
            p.erstehilfe_datum,
            p.erstehilfe_uhrzeit,
            p.erstehilfe_massnahmen,
            p.ersthelfer_name,
            p.bearbeiter_id,
            at_str,
          ],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(AccidentRecord { id, accident, created_at, updated_at: None })
  }

  async fn get(&self, id: i64) -> Result<Option<AccidentRecord>> {
    let conn = self.pool.acquire().await?;
    let raw: Option<RawAccident> = conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COLUMNS} FROM accidents WHERE id = ?1"),
              rusqlite::params![id],
              RawAccident::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccident::into_record).transpose()
  }

  async fn list(&self, query: &AccidentQuery) -> Result<Vec<AccidentRecord>> {
    let needle = query.name_filter.as_deref().map(str::to_lowercase);
    let limit = i64::from(query.page.size);
    let offset = i64::try_from(query.page.offset()).unwrap_or(i64::MAX);

    let conn = self.pool.acquire().await?;
    let raws: Vec<RawAccident> = conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COLUMNS}
           FROM accidents
           WHERE ?1 IS NULL OR instr(casefold(name_verletzte_person), ?1) > 0
           ORDER BY created_at DESC, id DESC
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![needle, limit, offset], RawAccident::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAccident::into_record).collect()
  }

  async fn update(&self, id: i64, accident: NewAccident) -> Result<Option<UpdatedAccident>> {
    let p = AccidentParams::from(&accident);
    let at_str = encode_dt(Utc::now());

    let conn = self.pool.acquire().await?;
    let row: Option<(i64, String, String)> = conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "UPDATE accidents SET
                 name_verletzte_person = ?1, unfall_datum = ?2, unfall_uhrzeit = ?3,
                 ort = ?4, hergang = ?5, art_der_verletzung = ?6, zeugen = ?7,
                 erstehilfe_datum = ?8, erstehilfe_uhrzeit = ?9,
                 erstehilfe_massnahmen = ?10, ersthelfer_name = ?11,
                 bearbeiter_id = ?12, updated_at = ?13
               WHERE id = ?14
               RETURNING id, name_verletzte_person, updated_at",
              rusqlite::params![
                p.name_verletzte_person,
                p.unfall_datum,
                p.unfall_uhrzeit,
                p.ort,
                p.hergang,
                p.art_der_verletzung,
                p.zeugen,
                p.erstehilfe_datum,
                p.erstehilfe_uhrzeit,
                p.erstehilfe_massnahmen,
                p.ersthelfer_name,
                p.bearbeiter_id,
                at_str,
                id,
              ],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?,
        )
      })
      .await?;

    row
      .map(|(id, name_verletzte_person, updated_at)| {
        Ok(UpdatedAccident {
          id,
          name_verletzte_person,
          updated_at: decode_dt(&updated_at)?,
        })
      })
      .transpose()
  }

  async fn delete(&self, id: i64) -> Result<Option<DeletedAccident>> {
    let conn = self.pool.acquire().await?;
    let deleted = conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "DELETE FROM accidents WHERE id = ?1 RETURNING id, name_verletzte_person",
              rusqlite::params![id],
              |row| {
                Ok(DeletedAccident {
                  id:                    row.get(0)?,
                  name_verletzte_person: row.get(1)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(deleted)
  }
}
