//! Plain-text rendering of records, shared by the one-shot commands and the
//! dashboard.

use chrono::{DateTime, Local, Utc};
use verbandbuch_core::{
  record::AccidentRecord,
  validate::{Field, format_display_date, format_time},
};

/// `dd.mm.yyyy hh:mm` in the local timezone.
pub fn local_timestamp(at: DateTime<Utc>) -> String {
  at.with_timezone(&Local).format("%d.%m.%Y %H:%M").to_string()
}

/// Accident date and time as shown in lists.
pub fn accident_when(record: &AccidentRecord) -> String {
  format!(
    "{} {}",
    format_display_date(record.accident.unfall_datum),
    format_time(record.accident.unfall_uhrzeit)
  )
}

/// Every field of `record` as `(label, value)` rows, in form order.
pub fn detail_rows(record: &AccidentRecord) -> Vec<(&'static str, String)> {
  let form = record.accident.to_candidate();
  let mut rows = vec![("ID", record.id.to_string())];
  rows.extend(
    Field::ALL
      .iter()
      .map(|f| (f.label(), form.get(*f).unwrap_or_default().to_owned())),
  );
  rows.push((
    "Bearbeiter",
    record
      .accident
      .bearbeiter_id
      .map_or_else(|| "—".to_owned(), |id| id.to_string()),
  ));
  rows.push(("Erfasst am", local_timestamp(record.created_at)));
  if let Some(at) = record.updated_at {
    rows.push(("Geändert am", local_timestamp(at)));
  }
  rows
}
