//! The validation engine.
//!
//! [`validate`] turns an [`AccidentCandidate`] into a [`NewAccident`] or a set
//! of per-field error messages. Every rule is evaluated independently, so the
//! caller sees all problems at once. Messages are in German, the fixed display
//! language of the application.

use std::{collections::BTreeMap, fmt};

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::record::{AccidentCandidate, NewAccident};

pub const MSG_REQUIRED: &str = "Dieses Feld ist erforderlich";
pub const MSG_DATE_FORMAT: &str = "Bitte im Format tt.mm.jjjj eingeben";
pub const MSG_TIME_FORMAT: &str = "Bitte im Format hh:mm (00–23:59) eingeben";
pub const MSG_FUTURE_DATE: &str = "Datum kann nicht in der Zukunft liegen";
pub const MSG_FIRST_AID_BEFORE_ACCIDENT: &str =
  "Erste-Hilfe kann nicht vor Unfall sein";

// ─── Fields ──────────────────────────────────────────────────────────────────

/// The required user-supplied fields of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
  NameVerletztePerson,
  UnfallDatum,
  UnfallUhrzeit,
  Ort,
  Hergang,
  ArtDerVerletzung,
  Zeugen,
  ErstehilfeDatum,
  ErstehilfeUhrzeit,
  ErstehilfeMassnahmen,
  ErsthelferName,
}

impl Field {
  /// All required fields, in form order.
  pub const ALL: [Field; 11] = [
    Field::NameVerletztePerson,
    Field::UnfallDatum,
    Field::UnfallUhrzeit,
    Field::Ort,
    Field::Hergang,
    Field::ArtDerVerletzung,
    Field::Zeugen,
    Field::ErstehilfeDatum,
    Field::ErstehilfeUhrzeit,
    Field::ErstehilfeMassnahmen,
    Field::ErsthelferName,
  ];

  /// Wire name, identical to the JSON key and the database column.
  pub fn as_str(self) -> &'static str {
    match self {
      Field::NameVerletztePerson => "name_verletzte_person",
      Field::UnfallDatum => "unfall_datum",
      Field::UnfallUhrzeit => "unfall_uhrzeit",
      Field::Ort => "ort",
      Field::Hergang => "hergang",
      Field::ArtDerVerletzung => "art_der_verletzung",
      Field::Zeugen => "zeugen",
      Field::ErstehilfeDatum => "erstehilfe_datum",
      Field::ErstehilfeUhrzeit => "erstehilfe_uhrzeit",
      Field::ErstehilfeMassnahmen => "erstehilfe_massnahmen",
      Field::ErsthelferName => "ersthelfer_name",
    }
  }

  /// Human-readable German label, as shown next to the form input.
  pub fn label(self) -> &'static str {
    match self {
      Field::NameVerletztePerson => "Name der verletzten Person",
      Field::UnfallDatum => "Datum des Unfalls",
      Field::UnfallUhrzeit => "Uhrzeit des Unfalls",
      Field::Ort => "Ort des Unfalls",
      Field::Hergang => "Hergang des Unfalls",
      Field::ArtDerVerletzung => "Art der Verletzung",
      Field::Zeugen => "Name der Zeugen",
      Field::ErstehilfeDatum => "Datum der Erste-Hilfe-Leistung",
      Field::ErstehilfeUhrzeit => "Uhrzeit der Erste-Hilfe-Leistung",
      Field::ErstehilfeMassnahmen => "Erste-Hilfe-Maßnahmen",
      Field::ErsthelferName => "Name des Ersthelfers",
    }
  }
}

impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Per-field error messages. At most one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn get(&self, field: Field) -> Option<&str> {
    self.0.get(&field).map(String::as_str)
  }

  pub fn contains(&self, field: Field) -> bool { self.0.contains_key(&field) }

  pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
    self.0.iter().map(|(f, m)| (*f, m.as_str()))
  }

  fn insert(&mut self, field: Field, message: &str) {
    self.0.insert(field, message.to_owned());
  }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, (field, message)) in self.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{field}: {message}")?;
    }
    Ok(())
  }
}

// ─── Syntax helpers ──────────────────────────────────────────────────────────

/// Parse a display-form date `dd.mm.yyyy` into a real calendar date.
///
/// Exactly two, two and four ASCII digits are required; impossible dates such
/// as `31.04.2024` or `29.02.2023` are rejected.
pub fn parse_display_date(raw: &str) -> Option<NaiveDate> {
  let b = raw.as_bytes();
  if b.len() != 10 || b[2] != b'.' || b[5] != b'.' {
    return None;
  }
  let day = digits(&b[0..2])?;
  let month = digits(&b[3..5])?;
  let year = digits(&b[6..10])?;
  NaiveDate::from_ymd_opt(year as i32, month, day)
}

/// Parse a time of day `hh:mm` with hour 00–23 and minute 00–59.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
  let b = raw.as_bytes();
  if b.len() != 5 || b[2] != b':' {
    return None;
  }
  let hour = digits(&b[0..2])?;
  let minute = digits(&b[3..5])?;
  if hour > 23 || minute > 59 {
    return None;
  }
  NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Inverse of [`parse_display_date`].
pub fn format_display_date(date: NaiveDate) -> String {
  date.format("%d.%m.%Y").to_string()
}

/// Inverse of [`parse_time`].
pub fn format_time(time: NaiveTime) -> String { time.format("%H:%M").to_string() }

fn digits(b: &[u8]) -> Option<u32> {
  b.iter().try_fold(0u32, |acc, c| {
    c.is_ascii_digit().then(|| acc * 10 + u32::from(c - b'0'))
  })
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Validate `candidate` as of the calendar day `today`.
///
/// Rules:
/// 1. every field of [`Field::ALL`] must be present and not blank;
/// 2. dates must be real dates in `dd.mm.yyyy` form;
/// 3. times must be `hh:mm` within 00:00–23:59;
/// 4. the accident must not lie after `today`, and first aid must not
///    precede the accident (both at day granularity);
/// 5. accepted text is trimmed, dates and times are typed.
pub fn validate(
  candidate: &AccidentCandidate,
  today: NaiveDate,
) -> Result<NewAccident, FieldErrors> {
  let mut errors = FieldErrors::default();

  let mut text = |field: Field| -> Option<String> {
    match candidate.get(field).map(str::trim) {
      Some(v) if !v.is_empty() => Some(v.to_owned()),
      _ => {
        errors.insert(field, MSG_REQUIRED);
        None
      }
    }
  };

  let name_verletzte_person = text(Field::NameVerletztePerson);
  let raw_unfall_datum = text(Field::UnfallDatum);
  let raw_unfall_uhrzeit = text(Field::UnfallUhrzeit);
  let ort = text(Field::Ort);
  let hergang = text(Field::Hergang);
  let art_der_verletzung = text(Field::ArtDerVerletzung);
  let zeugen = text(Field::Zeugen);
  let raw_erstehilfe_datum = text(Field::ErstehilfeDatum);
  let raw_erstehilfe_uhrzeit = text(Field::ErstehilfeUhrzeit);
  let erstehilfe_massnahmen = text(Field::ErstehilfeMassnahmen);
  let ersthelfer_name = text(Field::ErsthelferName);

  let mut date = |field: Field, raw: Option<String>| {
    let raw = raw?;
    let parsed = parse_display_date(&raw);
    if parsed.is_none() {
      errors.insert(field, MSG_DATE_FORMAT);
    }
    parsed
  };
  let unfall_datum = date(Field::UnfallDatum, raw_unfall_datum);
  let erstehilfe_datum = date(Field::ErstehilfeDatum, raw_erstehilfe_datum);

  let mut time = |field: Field, raw: Option<String>| {
    let raw = raw?;
    let parsed = parse_time(&raw);
    if parsed.is_none() {
      errors.insert(field, MSG_TIME_FORMAT);
    }
    parsed
  };
  let unfall_uhrzeit = time(Field::UnfallUhrzeit, raw_unfall_uhrzeit);
  let erstehilfe_uhrzeit = time(Field::ErstehilfeUhrzeit, raw_erstehilfe_uhrzeit);

  if let Some(u) = unfall_datum
    && u > today
  {
    errors.insert(Field::UnfallDatum, MSG_FUTURE_DATE);
  }
  if let (Some(u), Some(e)) = (unfall_datum, erstehilfe_datum)
    && e < u
  {
    errors.insert(Field::ErstehilfeDatum, MSG_FIRST_AID_BEFORE_ACCIDENT);
  }

  let (
    Some(name_verletzte_person),
    Some(unfall_datum),
    Some(unfall_uhrzeit),
    Some(ort),
    Some(hergang),
    Some(art_der_verletzung),
    Some(zeugen),
    Some(erstehilfe_datum),
    Some(erstehilfe_uhrzeit),
    Some(erstehilfe_massnahmen),
    Some(ersthelfer_name),
  ) = (
    name_verletzte_person,
    unfall_datum,
    unfall_uhrzeit,
    ort,
    hergang,
    art_der_verletzung,
    zeugen,
    erstehilfe_datum,
    erstehilfe_uhrzeit,
    erstehilfe_massnahmen,
    ersthelfer_name,
  )
  else {
    return Err(errors);
  };

  if !errors.is_empty() {
    return Err(errors);
  }

  Ok(NewAccident {
    name_verletzte_person,
    unfall_datum,
    unfall_uhrzeit,
    ort,
    hergang,
    art_der_verletzung,
    zeugen,
    erstehilfe_datum,
    erstehilfe_uhrzeit,
    erstehilfe_massnahmen,
    ersthelfer_name,
    bearbeiter_id: candidate.bearbeiter_id,
  })
}
