//! Integration tests for `SqliteStore` against in-memory and temporary-file
//! databases.

use std::{sync::Arc, time::Duration};

use chrono::{NaiveDate, NaiveTime};
use verbandbuch_core::{
  Error as ServiceError,
  query::{AccidentQuery, Page},
  record::{AccidentCandidate, NewAccident},
  service::AccidentService,
  store::AccidentStore,
  validate::Field,
};

use crate::{Error, SqliteStore, StoreConfig};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn accident(name: &str) -> NewAccident {
  NewAccident {
    name_verletzte_person: name.into(),
    unfall_datum:          NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
    unfall_uhrzeit:        NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
    ort:                   "Lagerhalle A".into(),
    hergang:               "Beim Heben einer Kiste ausgerutscht.".into(),
    art_der_verletzung:    "Prellung rechter Fuß".into(),
    zeugen:                "Erika Beispiel".into(),
    erstehilfe_datum:      NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
    erstehilfe_uhrzeit:    NaiveTime::from_hms_opt(9, 20, 0).unwrap(),
    erstehilfe_massnahmen: "Fuß gekühlt, Pflaster".into(),
    ersthelfer_name:       "Petra Richter".into(),
    bearbeiter_id:         Some(1),
  }
}

fn query(page: u32, size: u32, name: Option<&str>) -> AccidentQuery {
  AccidentQuery::new(Page::new(page, size), name)
}

fn names(records: &[verbandbuch_core::record::AccidentRecord]) -> Vec<&str> {
  records
    .iter()
    .map(|r| r.accident.name_verletzte_person.as_str())
    .collect()
}

// ─── Insert / get ────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get() {
  let s = store().await;

  let record = s.insert(accident("Max Mustermann")).await.unwrap();
  assert!(record.id > 0);
  assert_eq!(record.updated_at, None);

  let fetched = s.get(record.id).await.unwrap().expect("record exists");
  assert_eq!(fetched, record);
  assert_eq!(fetched.accident, accident("Max Mustermann"));
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(999_999).await.unwrap().is_none());
}

#[tokio::test]
async fn absent_bearbeiter_is_stored_as_null() {
  let s = store().await;
  let mut a = accident("Anna Schmidt");
  a.bearbeiter_id = None;
  let record = s.insert(a).await.unwrap();
  assert_eq!(s.get(record.id).await.unwrap().unwrap().accident.bearbeiter_id, None);
}

#[tokio::test]
async fn ids_are_never_reused() {
  let s = store().await;
  let first = s.insert(accident("A")).await.unwrap();
  let second = s.insert(accident("B")).await.unwrap();
  s.delete(second.id).await.unwrap().unwrap();

  let third = s.insert(accident("C")).await.unwrap();
  assert!(third.id > second.id);
  assert!(second.id > first.id);
}

// ─── List ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_orders_newest_first() {
  let s = store().await;
  for name in ["Erster", "Zweiter", "Dritter"] {
    s.insert(accident(name)).await.unwrap();
  }

  let all = s.list(&query(1, 10, None)).await.unwrap();
  assert_eq!(names(&all), ["Dritter", "Zweiter", "Erster"]);
}

#[tokio::test]
async fn list_paginates_by_offset() {
  let s = store().await;
  for i in 1..=7 {
    s.insert(accident(&format!("Person {i}"))).await.unwrap();
  }

  let p1 = s.list(&query(1, 3, None)).await.unwrap();
  let p2 = s.list(&query(2, 3, None)).await.unwrap();
  let p3 = s.list(&query(3, 3, None)).await.unwrap();
  let p4 = s.list(&query(4, 3, None)).await.unwrap();

  assert_eq!(names(&p1), ["Person 7", "Person 6", "Person 5"]);
  assert_eq!(names(&p2), ["Person 4", "Person 3", "Person 2"]);
  assert_eq!(names(&p3), ["Person 1"]);
  assert!(p4.is_empty());
}

#[tokio::test]
async fn search_is_case_insensitive_substring() {
  let s = store().await;
  for name in ["Anna Schmidt", "Max Mustermann", "Johanna Berg", "ANNABELL Groß", "Julia Weber"] {
    s.insert(accident(name)).await.unwrap();
  }

  let hits = s.list(&query(1, 10, Some("anna"))).await.unwrap();
  let mut found = names(&hits);
  found.sort_unstable();
  assert_eq!(found, ["ANNABELL Groß", "Anna Schmidt", "Johanna Berg"]);
}

#[tokio::test]
async fn search_folds_umlauts() {
  let s = store().await;
  s.insert(accident("Jürgen Öztürk")).await.unwrap();
  s.insert(accident("Max Mustermann")).await.unwrap();

  let hits = s.list(&query(1, 10, Some("ÖZTÜRK"))).await.unwrap();
  assert_eq!(names(&hits), ["Jürgen Öztürk"]);
}

#[tokio::test]
async fn search_treats_like_wildcards_literally() {
  let s = store().await;
  s.insert(accident("Max Mustermann")).await.unwrap();
  s.insert(accident("100% Sicher")).await.unwrap();

  assert_eq!(names(&s.list(&query(1, 10, Some("%"))).await.unwrap()), ["100% Sicher"]);
  assert!(s.list(&query(1, 10, Some("_"))).await.unwrap().is_empty());
}

#[tokio::test]
async fn repeated_reads_are_identical() {
  let s = store().await;
  let record = s.insert(accident("Max")).await.unwrap();

  assert_eq!(s.get(record.id).await.unwrap(), s.get(record.id).await.unwrap());
  let q = query(1, 10, Some("ma"));
  assert_eq!(s.list(&q).await.unwrap(), s.list(&q).await.unwrap());
}

// ─── Update / delete ─────────────────────────────────────────────────────────

#[tokio::test]
async fn update_overwrites_all_fields_and_keeps_created_at() {
  let s = store().await;
  let record = s.insert(accident("Anna Schmidt")).await.unwrap();

  let mut replacement = accident("Anna Schmidt-Meyer");
  replacement.ort = "Büro EG".into();
  replacement.bearbeiter_id = None;
  let updated = s
    .update(record.id, replacement.clone())
    .await
    .unwrap()
    .expect("record exists");
  assert_eq!(updated.id, record.id);
  assert_eq!(updated.name_verletzte_person, "Anna Schmidt-Meyer");

  let fetched = s.get(record.id).await.unwrap().unwrap();
  assert_eq!(fetched.accident, replacement);
  assert_eq!(fetched.created_at, record.created_at);
  assert_eq!(fetched.updated_at, Some(updated.updated_at));
}

#[tokio::test]
async fn update_missing_returns_none() {
  let s = store().await;
  assert!(s.update(42, accident("X")).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_returns_identifying_fields_once() {
  let s = store().await;
  let record = s.insert(accident("Julia Weber")).await.unwrap();

  let deleted = s.delete(record.id).await.unwrap().expect("record exists");
  assert_eq!(deleted.id, record.id);
  assert_eq!(deleted.name_verletzte_person, "Julia Weber");

  assert!(s.get(record.id).await.unwrap().is_none());
  assert!(s.delete(record.id).await.unwrap().is_none());
}

#[tokio::test]
async fn truncate_clears_and_restarts_ids() {
  let s = store().await;
  s.insert(accident("A")).await.unwrap();
  s.insert(accident("B")).await.unwrap();
  assert_eq!(s.count().await.unwrap(), 2);

  s.truncate().await.unwrap();
  assert_eq!(s.count().await.unwrap(), 0);
  assert_eq!(s.insert(accident("C")).await.unwrap().id, 1);
}

// ─── Pool ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn in_memory_pool_has_one_connection() {
  let s = store().await;
  assert_eq!(s.pool().size(), 1);
  assert_eq!(s.pool().available(), 1);
}

#[tokio::test]
async fn exhausted_pool_times_out_as_storage_failure() {
  let config = StoreConfig {
    acquire_timeout_ms: 50,
    ..StoreConfig::in_memory()
  };
  let s = SqliteStore::open(&config).await.unwrap();

  let held = s.pool().acquire().await.unwrap();
  assert_eq!(s.pool().available(), 0);

  let err = s.get(1).await.unwrap_err();
  assert!(matches!(err, Error::PoolTimeout(d) if d == Duration::from_millis(50)));

  drop(held);
  assert_eq!(s.pool().available(), 1);
  assert!(s.get(1).await.unwrap().is_none());
}

#[tokio::test]
async fn zero_connections_is_rejected() {
  let config = StoreConfig {
    max_connections: 0,
    ..StoreConfig::in_memory()
  };
  assert!(matches!(SqliteStore::open(&config).await, Err(Error::Config(_))));
}

#[tokio::test]
async fn file_store_serves_concurrent_writers() {
  let dir = tempfile::tempdir().unwrap();
  let config = StoreConfig {
    path: dir.path().join("verbandbuch.db"),
    max_connections: 4,
    ..StoreConfig::default()
  };
  let s = SqliteStore::open(&config).await.unwrap();
  assert_eq!(s.pool().size(), 4);

  let mut handles = Vec::new();
  for i in 0..16 {
    let s = s.clone();
    handles.push(tokio::spawn(async move {
      s.insert(accident(&format!("Person {i}"))).await.map(|r| r.id)
    }));
  }
  let mut ids = Vec::new();
  for h in handles {
    ids.push(h.await.unwrap().unwrap());
  }
  ids.sort_unstable();
  ids.dedup();
  assert_eq!(ids.len(), 16);
  assert_eq!(s.count().await.unwrap(), 16);
  assert_eq!(s.pool().available(), 4);
}

#[tokio::test]
async fn file_store_persists_across_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let config = StoreConfig {
    path: dir.path().join("verbandbuch.db"),
    ..StoreConfig::default()
  };

  let id = {
    let s = SqliteStore::open(&config).await.unwrap();
    s.insert(accident("Max Mustermann")).await.unwrap().id
  };

  let reopened = SqliteStore::open(&config).await.unwrap();
  let record = reopened.get(id).await.unwrap().expect("persisted");
  assert_eq!(record.accident.name_verletzte_person, "Max Mustermann");
}

// ─── Record service over SQLite ──────────────────────────────────────────────

fn fixed_today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 11, 1).unwrap() }

async fn service() -> AccidentService<SqliteStore> {
  AccidentService::with_clock(Arc::new(store().await), fixed_today)
}

fn candidate(name: &str) -> AccidentCandidate {
  let mut c = accident(name).to_candidate();
  c.set(Field::Hergang, "...");
  c
}

#[tokio::test]
async fn service_create_then_get_round_trips_user_fields() {
  let svc = service().await;
  let c = candidate("Max Mustermann");

  let created = svc.create(&c).await.unwrap();
  let fetched = svc.get(&created.id.to_string()).await.unwrap();
  assert_eq!(fetched.accident, svc.check(&c).unwrap());
  assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
async fn service_delete_then_get_is_not_found() {
  let svc = service().await;
  let created = svc.create(&candidate("Julia Weber")).await.unwrap();
  let id = created.id.to_string();

  svc.delete(&id).await.unwrap();
  assert!(matches!(svc.get(&id).await, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn service_rejects_invalid_update_without_writing() {
  let svc = service().await;
  let created = svc.create(&candidate("Anna Schmidt")).await.unwrap();
  let id = created.id.to_string();

  let mut bad = candidate("Anna Schmidt");
  bad.set(Field::UnfallUhrzeit, "24:00");
  assert!(matches!(svc.update(&id, &bad).await, Err(ServiceError::Validation(_))));

  let fetched = svc.get(&id).await.unwrap();
  assert_eq!(fetched.updated_at, None);
}

#[tokio::test]
async fn service_reports_pool_timeout_as_storage_error() {
  let config = StoreConfig {
    acquire_timeout_ms: 20,
    ..StoreConfig::in_memory()
  };
  let svc = AccidentService::with_clock(
    Arc::new(SqliteStore::open(&config).await.unwrap()),
    fixed_today,
  );

  let _held = svc.store().pool().acquire().await.unwrap();
  assert!(matches!(svc.get("1").await, Err(ServiceError::Storage(_))));
}
