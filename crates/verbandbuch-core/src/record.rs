//! Accident records and the shapes they take on the way in and out.
//!
//! A record enters the system as an [`AccidentCandidate`] (raw strings, as
//! typed into a form), is normalised by [`crate::validate::validate`] into a
//! [`NewAccident`], and is persisted as an [`AccidentRecord`] once the store
//! has assigned an id and a creation timestamp.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::{Field, format_display_date, format_time};

// ─── Candidate ───────────────────────────────────────────────────────────────

/// Unvalidated input destined to become a record.
///
/// Every user field is optional so that missing keys can be reported as
/// "required" instead of failing deserialisation. Dates are expected in
/// display form (`dd.mm.yyyy`), times as `hh:mm`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccidentCandidate {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name_verletzte_person: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub unfall_datum:          Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub unfall_uhrzeit:        Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ort:                   Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub hergang:               Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub art_der_verletzung:    Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub zeugen:                Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub erstehilfe_datum:      Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub erstehilfe_uhrzeit:    Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub erstehilfe_massnahmen: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ersthelfer_name:       Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub bearbeiter_id:         Option<i64>,
}

impl AccidentCandidate {
  /// The raw value supplied for `field`, if any.
  pub fn get(&self, field: Field) -> Option<&str> {
    let value = match field {
      Field::NameVerletztePerson => &self.name_verletzte_person,
      Field::UnfallDatum => &self.unfall_datum,
      Field::UnfallUhrzeit => &self.unfall_uhrzeit,
      Field::Ort => &self.ort,
      Field::Hergang => &self.hergang,
      Field::ArtDerVerletzung => &self.art_der_verletzung,
      Field::Zeugen => &self.zeugen,
      Field::ErstehilfeDatum => &self.erstehilfe_datum,
      Field::ErstehilfeUhrzeit => &self.erstehilfe_uhrzeit,
      Field::ErstehilfeMassnahmen => &self.erstehilfe_massnahmen,
      Field::ErsthelferName => &self.ersthelfer_name,
    };
    value.as_deref()
  }

  /// Overwrite the raw value for `field`.
  pub fn set(&mut self, field: Field, value: impl Into<String>) {
    let slot = match field {
      Field::NameVerletztePerson => &mut self.name_verletzte_person,
      Field::UnfallDatum => &mut self.unfall_datum,
      Field::UnfallUhrzeit => &mut self.unfall_uhrzeit,
      Field::Ort => &mut self.ort,
      Field::Hergang => &mut self.hergang,
      Field::ArtDerVerletzung => &mut self.art_der_verletzung,
      Field::Zeugen => &mut self.zeugen,
      Field::ErstehilfeDatum => &mut self.erstehilfe_datum,
      Field::ErstehilfeUhrzeit => &mut self.erstehilfe_uhrzeit,
      Field::ErstehilfeMassnahmen => &mut self.erstehilfe_massnahmen,
      Field::ErsthelferName => &mut self.ersthelfer_name,
    };
    *slot = Some(value.into());
  }
}

// ─── Accepted input ──────────────────────────────────────────────────────────

/// A candidate that passed validation: trimmed text, typed dates and times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccident {
  pub name_verletzte_person: String,
  pub unfall_datum:          NaiveDate,
  #[serde(with = "hhmm")]
  pub unfall_uhrzeit:        NaiveTime,
  pub ort:                   String,
  pub hergang:               String,
  pub art_der_verletzung:    String,
  pub zeugen:                String,
  pub erstehilfe_datum:      NaiveDate,
  #[serde(with = "hhmm")]
  pub erstehilfe_uhrzeit:    NaiveTime,
  pub erstehilfe_massnahmen: String,
  pub ersthelfer_name:       String,
  pub bearbeiter_id:         Option<i64>,
}

impl NewAccident {
  /// Render back into display form, e.g. to pre-fill an edit form.
  ///
  /// Validating the result against the same `today` yields `self` again.
  pub fn to_candidate(&self) -> AccidentCandidate {
    AccidentCandidate {
      name_verletzte_person: Some(self.name_verletzte_person.clone()),
      unfall_datum:          Some(format_display_date(self.unfall_datum)),
      unfall_uhrzeit:        Some(format_time(self.unfall_uhrzeit)),
      ort:                   Some(self.ort.clone()),
      hergang:               Some(self.hergang.clone()),
      art_der_verletzung:    Some(self.art_der_verletzung.clone()),
      zeugen:                Some(self.zeugen.clone()),
      erstehilfe_datum:      Some(format_display_date(self.erstehilfe_datum)),
      erstehilfe_uhrzeit:    Some(format_time(self.erstehilfe_uhrzeit)),
      erstehilfe_massnahmen: Some(self.erstehilfe_massnahmen.clone()),
      ersthelfer_name:       Some(self.ersthelfer_name.clone()),
      bearbeiter_id:         self.bearbeiter_id,
    }
  }
}

// ─── Persisted record ────────────────────────────────────────────────────────

/// One row of the accident log.
///
/// `id` and `created_at` are assigned by the store on insert and never change.
/// `updated_at` is `None` until the record is first overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccidentRecord {
  pub id:         i64,
  #[serde(flatten)]
  pub accident:   NewAccident,
  pub created_at: DateTime<Utc>,
  pub updated_at: Option<DateTime<Utc>>,
}

/// Confirmation payload for a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedAccident {
  pub id:                    i64,
  pub name_verletzte_person: String,
  pub created_at:            DateTime<Utc>,
}

impl From<&AccidentRecord> for CreatedAccident {
  fn from(r: &AccidentRecord) -> Self {
    Self {
      id:                    r.id,
      name_verletzte_person: r.accident.name_verletzte_person.clone(),
      created_at:            r.created_at,
    }
  }
}

/// Confirmation payload for a successful update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedAccident {
  pub id:                    i64,
  pub name_verletzte_person: String,
  pub updated_at:            DateTime<Utc>,
}

/// Identifying fields of a deleted record, for confirmation messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedAccident {
  pub id:                    i64,
  pub name_verletzte_person: String,
}

// ─── Serde helpers ───────────────────────────────────────────────────────────

/// Times of day travel as zero-padded `hh:mm`; `hh:mm:ss` is accepted on
/// input and the seconds are dropped.
pub mod hhmm {
  use chrono::{NaiveTime, Timelike as _};
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&t.format("%H:%M"))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(d)?;
    NaiveTime::parse_from_str(&raw, "%H:%M")
      .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
      .ok()
      .and_then(|t| t.with_second(0))
      .ok_or_else(|| D::Error::custom(format!("invalid time of day: {raw:?}")))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> NewAccident {
    NewAccident {
      name_verletzte_person: "Max Mustermann".into(),
      unfall_datum:          NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
      unfall_uhrzeit:        NaiveTime::from_hms_opt(9, 5, 0).unwrap(),
      ort:                   "Lagerhalle A".into(),
      hergang:               "Beim Heben einer Kiste ausgerutscht.".into(),
      art_der_verletzung:    "Prellung".into(),
      zeugen:                "Erika".into(),
      erstehilfe_datum:      NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
      erstehilfe_uhrzeit:    NaiveTime::from_hms_opt(9, 20, 0).unwrap(),
      erstehilfe_massnahmen: "Fuß gekühlt".into(),
      ersthelfer_name:       "Petra Richter".into(),
      bearbeiter_id:         Some(1),
    }
  }

  #[test]
  fn record_serialises_flat_with_iso_dates_and_short_times() {
    let record = AccidentRecord {
      id:         7,
      accident:   sample(),
      created_at: Utc::now(),
      updated_at: None,
    };
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["unfall_datum"], "2024-10-01");
    assert_eq!(json["unfall_uhrzeit"], "09:05");
    assert_eq!(json["erstehilfe_uhrzeit"], "09:20");
    assert!(json["updated_at"].is_null());

    let back: AccidentRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, record);
  }

  #[test]
  fn time_with_seconds_is_accepted_on_input() {
    let mut json = serde_json::to_value(sample()).unwrap();
    json["unfall_uhrzeit"] = "14:05:00".into();
    let parsed: NewAccident = serde_json::from_value(json).unwrap();
    assert_eq!(parsed.unfall_uhrzeit, NaiveTime::from_hms_opt(14, 5, 0).unwrap());
  }

  #[test]
  fn candidate_missing_keys_deserialise_as_none() {
    let c: AccidentCandidate =
      serde_json::from_str(r#"{"name_verletzte_person":"Anna"}"#).unwrap();
    assert_eq!(c.get(Field::NameVerletztePerson), Some("Anna"));
    assert_eq!(c.get(Field::Ort), None);
    assert_eq!(c.bearbeiter_id, None);
  }

  #[test]
  fn to_candidate_uses_display_form() {
    let c = sample().to_candidate();
    assert_eq!(c.unfall_datum.as_deref(), Some("01.10.2024"));
    assert_eq!(c.unfall_uhrzeit.as_deref(), Some("09:05"));
    assert_eq!(c.bearbeiter_id, Some(1));
  }
}
