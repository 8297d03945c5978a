//! Command-line form input for reporting and editing accidents.

use clap::Args;
use verbandbuch_core::{
  record::{AccidentCandidate, NewAccident},
  validate::{Field, FieldErrors, validate},
};

/// One flag per form field. Dates as `tt.mm.jjjj`, times as `hh:mm`.
#[derive(Args, Debug, Default, Clone)]
pub struct FormArgs {
  /// Name der verletzten Person.
  #[arg(long)]
  pub name: Option<String>,

  /// Datum des Unfalls (tt.mm.jjjj).
  #[arg(long)]
  pub unfall_datum: Option<String>,

  /// Uhrzeit des Unfalls (hh:mm).
  #[arg(long)]
  pub unfall_uhrzeit: Option<String>,

  /// Ort des Unfalls.
  #[arg(long)]
  pub ort: Option<String>,

  /// Hergang des Unfalls.
  #[arg(long)]
  pub hergang: Option<String>,

  /// Art der Verletzung.
  #[arg(long)]
  pub verletzung: Option<String>,

  /// Namen der Zeugen oder "keine Zeugen".
  #[arg(long)]
  pub zeugen: Option<String>,

  /// Datum der Erste-Hilfe-Leistung (tt.mm.jjjj).
  #[arg(long)]
  pub erstehilfe_datum: Option<String>,

  /// Uhrzeit der Erste-Hilfe-Leistung (hh:mm).
  #[arg(long)]
  pub erstehilfe_uhrzeit: Option<String>,

  /// Erste-Hilfe-Maßnahmen.
  #[arg(long)]
  pub massnahmen: Option<String>,

  /// Name des Ersthelfers.
  #[arg(long)]
  pub ersthelfer: Option<String>,

  /// ID des Bearbeiters.
  #[arg(long)]
  pub bearbeiter_id: Option<i64>,
}

impl FormArgs {
  fn values(&self) -> [(Field, Option<&String>); 11] {
    [
      (Field::NameVerletztePerson, self.name.as_ref()),
      (Field::UnfallDatum, self.unfall_datum.as_ref()),
      (Field::UnfallUhrzeit, self.unfall_uhrzeit.as_ref()),
      (Field::Ort, self.ort.as_ref()),
      (Field::Hergang, self.hergang.as_ref()),
      (Field::ArtDerVerletzung, self.verletzung.as_ref()),
      (Field::Zeugen, self.zeugen.as_ref()),
      (Field::ErstehilfeDatum, self.erstehilfe_datum.as_ref()),
      (Field::ErstehilfeUhrzeit, self.erstehilfe_uhrzeit.as_ref()),
      (Field::ErstehilfeMassnahmen, self.massnahmen.as_ref()),
      (Field::ErsthelferName, self.ersthelfer.as_ref()),
    ]
  }

  /// Overlay the given flags onto `base`; absent flags keep `base`'s value.
  pub fn apply(&self, mut base: AccidentCandidate) -> AccidentCandidate {
    for (field, value) in self.values() {
      if let Some(v) = value {
        base.set(field, v.as_str());
      }
    }
    if self.bearbeiter_id.is_some() {
      base.bearbeiter_id = self.bearbeiter_id;
    }
    base
  }

  pub fn is_empty(&self) -> bool {
    self.values().iter().all(|(_, v)| v.is_none()) && self.bearbeiter_id.is_none()
  }
}

/// Run the shared validation engine and return the normalised candidate to
/// submit.
pub fn check(
  candidate: &AccidentCandidate,
  today: chrono::NaiveDate,
) -> Result<AccidentCandidate, FieldErrors> {
  validate(candidate, today).map(|accepted: NewAccident| accepted.to_candidate())
}

/// Print per-field errors with their labels, one per line, to stderr.
pub fn print_field_errors<'a>(errors: impl IntoIterator<Item = (&'static str, &'a str)>) {
  for (label, message) in errors {
    eprintln!("  {label}: {message}");
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use verbandbuch_core::validate::{MSG_FUTURE_DATE, MSG_REQUIRED};

  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 11, 1).unwrap() }

  fn full() -> FormArgs {
    FormArgs {
      name:               Some("Max Mustermann".into()),
      unfall_datum:       Some("01.10.2024".into()),
      unfall_uhrzeit:     Some("09:15".into()),
      ort:                Some("Lagerhalle A".into()),
      hergang:            Some("Ausgerutscht.".into()),
      verletzung:         Some("Prellung".into()),
      zeugen:             Some("keine Zeugen".into()),
      erstehilfe_datum:   Some("01.10.2024".into()),
      erstehilfe_uhrzeit: Some("09:20".into()),
      massnahmen:         Some("Gekühlt".into()),
      ersthelfer:         Some("Petra Richter".into()),
      bearbeiter_id:      None,
    }
  }

  #[test]
  fn missing_flags_are_reported_as_required() {
    let args = FormArgs { ort: None, ..full() };
    let errors = check(&args.apply(AccidentCandidate::default()), today()).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get(Field::Ort), Some(MSG_REQUIRED));
  }

  #[test]
  fn accepted_input_is_normalised_before_sending() {
    let args = FormArgs {
      name: Some("  Max Mustermann ".into()),
      unfall_uhrzeit: Some(" 09:15".into()),
      ..full()
    };
    let sent = check(&args.apply(AccidentCandidate::default()), today()).unwrap();
    assert_eq!(sent.name_verletzte_person.as_deref(), Some("Max Mustermann"));
    assert_eq!(sent.unfall_uhrzeit.as_deref(), Some("09:15"));
  }

  #[test]
  fn apply_overlays_only_given_flags() {
    let base = full().apply(AccidentCandidate::default());
    let edit = FormArgs { ort: Some("Lagerhalle B".into()), ..FormArgs::default() };
    let merged = edit.apply(base.clone());
    assert_eq!(merged.ort.as_deref(), Some("Lagerhalle B"));
    assert_eq!(merged.hergang, base.hergang);
    assert!(!edit.is_empty());
    assert!(FormArgs::default().is_empty());
  }

  #[test]
  fn future_accident_is_caught_locally() {
    let args = FormArgs {
      unfall_datum: Some("02.11.2024".into()),
      erstehilfe_datum: Some("02.11.2024".into()),
      ..full()
    };
    let errors = check(&args.apply(AccidentCandidate::default()), today()).unwrap_err();
    assert_eq!(errors.get(Field::UnfallDatum), Some(MSG_FUTURE_DATE));
  }
}
