//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `yyyy-mm-dd`, times of day as `hh:mm`, timestamps as
//! fixed-width RFC 3339 UTC strings so that text order equals time order.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use verbandbuch_core::record::{AccidentRecord, NewAccident};

use crate::{Error, Result};

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

/// Truncate to what survives an encode/decode round trip.
pub fn stored_precision(dt: DateTime<Utc>) -> Result<DateTime<Utc>> { decode_dt(&encode_dt(dt)) }

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── NaiveTime ────────────────────────────────────────────────────────────────

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row parameters ───────────────────────────────────────────────────────────

/// The user fields of a record as bindable column values, in
/// `name_verletzte_person .. bearbeiter_id` order.
pub struct AccidentParams {
  pub name_verletzte_person: String,
  pub unfall_datum:          String,
  pub unfall_uhrzeit:        String,
  pub ort:                   String,
  pub hergang:               String,
  pub art_der_verletzung:    String,
  pub zeugen:                String,
  pub erstehilfe_datum:      String,
  pub erstehilfe_uhrzeit:    String,
  pub erstehilfe_massnahmen: String,
  pub ersthelfer_name:       String,
  pub bearbeiter_id:         Option<i64>,
}

impl From<&NewAccident> for AccidentParams {
  fn from(a: &NewAccident) -> Self {
    Self {
      name_verletzte_person: a.name_verletzte_person.clone(),
      unfall_datum:          encode_date(a.unfall_datum),
      unfall_uhrzeit:        encode_time(a.unfall_uhrzeit),
      ort:                   a.ort.clone(),
      hergang:               a.hergang.clone(),
      art_der_verletzung:    a.art_der_verletzung.clone(),
      zeugen:                a.zeugen.clone(),
      erstehilfe_datum:      encode_date(a.erstehilfe_datum),
      erstehilfe_uhrzeit:    encode_time(a.erstehilfe_uhrzeit),
      erstehilfe_massnahmen: a.erstehilfe_massnahmen.clone(),
      ersthelfer_name:       a.ersthelfer_name.clone(),
      bearbeiter_id:         a.bearbeiter_id,
    }
  }
}

// ─── Raw row ──────────────────────────────────────────────────────────────────

/// An `accidents` row exactly as read from SQLite, before decoding.
pub struct RawAccident {
  pub id:                    i64,
  pub name_verletzte_person: String,
  pub unfall_datum:          String,
  pub unfall_uhrzeit:        String,
  pub ort:                   String,
  pub hergang:               String,
  pub art_der_verletzung:    String,
  pub zeugen:                String,
  pub erstehilfe_datum:      String,
  pub erstehilfe_uhrzeit:    String,
  pub erstehilfe_massnahmen: String,
  pub ersthelfer_name:       String,
  pub bearbeiter_id:         Option<i64>,
  pub created_at:            String,
  pub updated_at:            Option<String>,
}

impl RawAccident {
  /// Read a row selected with [`crate::schema::COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                    row.get(0)?,
      name_verletzte_person: row.get(1)?,
      unfall_datum:          row.get(2)?,
      unfall_uhrzeit:        row.get(3)?,
      ort:                   row.get(4)?,
      hergang:               row.get(5)?,
      art_der_verletzung:    row.get(6)?,
      zeugen:                row.get(7)?,
      erstehilfe_datum:      row.get(8)?,
      erstehilfe_uhrzeit:    row.get(9)?,
      erstehilfe_massnahmen: row.get(10)?,
      ersthelfer_name:       row.get(11)?,
      bearbeiter_id:         row.get(12)?,
      created_at:            row.get(13)?,
      updated_at:            row.get(14)?,
    })
  }

  pub fn into_record(self) -> Result<AccidentRecord> {
    Ok(AccidentRecord {
      id:         self.id,
      accident:   NewAccident {
        name_verletzte_person: self.name_verletzte_person,
        unfall_datum:          decode_date(&self.unfall_datum)?,
        unfall_uhrzeit:        decode_time(&self.unfall_uhrzeit)?,
        ort:                   self.ort,
        hergang:               self.hergang,
        art_der_verletzung:    self.art_der_verletzung,
        zeugen:                self.zeugen,
        erstehilfe_datum:      decode_date(&self.erstehilfe_datum)?,
        erstehilfe_uhrzeit:    decode_time(&self.erstehilfe_uhrzeit)?,
        erstehilfe_massnahmen: self.erstehilfe_massnahmen,
        ersthelfer_name:       self.ersthelfer_name,
        bearbeiter_id:         self.bearbeiter_id,
      },
      created_at: decode_dt(&self.created_at)?,
      updated_at: self.updated_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}
