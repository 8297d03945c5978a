//! Sample records for a fresh installation.

use anyhow::Context as _;
use verbandbuch_core::{record::AccidentCandidate, service::AccidentService};
use verbandbuch_store_sqlite::SqliteStore;

/// Outcome of a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
  pub inserted: usize,
  pub total:    u64,
}

struct Sample {
  name:       &'static str,
  datum:      &'static str,
  uhrzeit:    &'static str,
  ort:        &'static str,
  hergang:    &'static str,
  verletzung: &'static str,
  zeugen:     &'static str,
  eh_datum:   &'static str,
  eh_uhrzeit: &'static str,
  massnahmen: &'static str,
  ersthelfer: &'static str,
  bearbeiter: i64,
}

const SAMPLES: [Sample; 3] = [
  Sample {
    name:       "Max Mustermann",
    datum:      "01.10.2024",
    uhrzeit:    "09:15",
    ort:        "Lagerhalle A",
    hergang:    "Beim Heben einer Kiste ausgerutscht.",
    verletzung: "Prellung rechter Fuß",
    zeugen:     "Erika Beispiel",
    eh_datum:   "01.10.2024",
    eh_uhrzeit: "09:20",
    massnahmen: "Fuß gekühlt, Pflaster",
    ersthelfer: "Petra Richter",
    bearbeiter: 1,
  },
  Sample {
    name:       "Anna Schmidt",
    datum:      "20.10.2024",
    uhrzeit:    "14:05",
    ort:        "Büro EG",
    hergang:    "Am Kopierer gestoßen.",
    verletzung: "Schürfwunde Handrücken",
    zeugen:     "—",
    eh_datum:   "20.10.2024",
    eh_uhrzeit: "14:08",
    massnahmen: "Wunde gereinigt, Pflaster",
    ersthelfer: "Max Admin",
    bearbeiter: 2,
  },
  Sample {
    name:       "Julia Weber",
    datum:      "28.10.2024",
    uhrzeit:    "08:45",
    ort:        "Küche Personalbereich, 1. Stock",
    hergang:    "Beim Öffnen der Mikrowelle kam heißer Dampf heraus.",
    verletzung: "Leichte Verbrennung Wange",
    zeugen:     "Lisa Beispiel",
    eh_datum:   "28.10.2024",
    eh_uhrzeit: "08:50",
    massnahmen: "Mit kaltem Wasser gekühlt, Brandsalbe aufgetragen.",
    ersthelfer: "Max Admin",
    bearbeiter: 2,
  },
];

impl Sample {
  fn candidate(&self) -> AccidentCandidate {
    AccidentCandidate {
      name_verletzte_person: Some(self.name.into()),
      unfall_datum:          Some(self.datum.into()),
      unfall_uhrzeit:        Some(self.uhrzeit.into()),
      ort:                   Some(self.ort.into()),
      hergang:               Some(self.hergang.into()),
      art_der_verletzung:    Some(self.verletzung.into()),
      zeugen:                Some(self.zeugen.into()),
      erstehilfe_datum:      Some(self.eh_datum.into()),
      erstehilfe_uhrzeit:    Some(self.eh_uhrzeit.into()),
      erstehilfe_massnahmen: Some(self.massnahmen.into()),
      ersthelfer_name:       Some(self.ersthelfer.into()),
      bearbeiter_id:         Some(self.bearbeiter),
    }
  }
}

/// The sample records in form input shape.
pub fn samples() -> Vec<AccidentCandidate> { SAMPLES.iter().map(Sample::candidate).collect() }

/// Insert the samples through the record service, optionally clearing the
/// table first.
pub async fn seed(
  service: &AccidentService<SqliteStore>,
  truncate: bool,
) -> anyhow::Result<SeedReport> {
  if truncate {
    service
      .store()
      .truncate()
      .await
      .context("failed to clear accidents")?;
    tracing::info!("cleared existing accidents");
  }

  let mut inserted = 0;
  for candidate in samples() {
    let created = service
      .create(&candidate)
      .await
      .with_context(|| format!("failed to insert sample {:?}", candidate.name_verletzte_person))?;
    tracing::debug!(id = created.id, name = %created.name_verletzte_person, "inserted sample");
    inserted += 1;
  }

  let total = service.store().count().await.context("failed to count accidents")?;
  Ok(SeedReport { inserted, total })
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use chrono::NaiveDate;
  use verbandbuch_core::validate::validate;

  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 11, 1).unwrap() }

  #[test]
  fn samples_pass_validation() {
    for candidate in samples() {
      let accepted = validate(&candidate, today());
      assert!(accepted.is_ok(), "{candidate:?}: {accepted:?}");
    }
  }

  #[tokio::test]
  async fn seed_inserts_and_truncate_resets() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let service = AccidentService::with_clock(Arc::new(store), today);

    let first = seed(&service, false).await.unwrap();
    assert_eq!(first, SeedReport { inserted: 3, total: 3 });

    let second = seed(&service, false).await.unwrap();
    assert_eq!(second.total, 6);

    let reset = seed(&service, true).await.unwrap();
    assert_eq!(reset.total, 3);
    let first_id = service.get("1").await.unwrap();
    assert_eq!(first_id.accident.name_verletzte_person, "Max Mustermann");
  }
}
