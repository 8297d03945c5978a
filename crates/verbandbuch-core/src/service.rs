//! The record service.
//!
//! Every operation the HTTP surface exposes goes through [`AccidentService`]:
//! ids are checked, candidates are validated with the same engine the client
//! uses, and store failures collapse into [`Error::Storage`]. Create and
//! update both validate; neither writes anything on failure.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::{
  error::{Error, Result},
  query::{AccidentQuery, Page},
  record::{
    AccidentCandidate, AccidentRecord, CreatedAccident, DeletedAccident,
    NewAccident, UpdatedAccident,
  },
  store::AccidentStore,
  validate::validate,
};

/// Source of "today" for the future-date rule.
pub type Clock = fn() -> NaiveDate;

/// The calendar date in the server's local timezone.
pub fn local_today() -> NaiveDate { Local::now().date_naive() }

/// Parse a path id: a positive integer, nothing else.
pub fn parse_id(raw: &str) -> Result<i64> {
  raw
    .trim()
    .parse::<i64>()
    .ok()
    .filter(|id| *id > 0)
    .ok_or_else(|| Error::InvalidId(raw.to_owned()))
}

/// One page of records plus the effective page parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
  pub records: Vec<AccidentRecord>,
  pub page:    Page,
}

impl Listing {
  /// Whether a following page may exist. Inferred from a full page.
  pub fn may_have_more(&self) -> bool {
    self.records.len() as u64 >= u64::from(self.page.size)
  }
}

/// Validation and persistence for accident records over any
/// [`AccidentStore`].
pub struct AccidentService<S> {
  store: Arc<S>,
  today: Clock,
}

impl<S> Clone for AccidentService<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      today: self.today,
    }
  }
}

impl<S: AccidentStore> AccidentService<S> {
  pub fn new(store: Arc<S>) -> Self { Self::with_clock(store, local_today) }

  /// Use `today` instead of the local calendar date.
  pub fn with_clock(store: Arc<S>, today: Clock) -> Self { Self { store, today } }

  pub fn store(&self) -> &S { &self.store }

  pub fn today(&self) -> NaiveDate { (self.today)() }

  /// Run the validation engine against this service's clock.
  pub fn check(&self, candidate: &AccidentCandidate) -> Result<NewAccident> {
    validate(candidate, self.today()).map_err(Error::Validation)
  }

  /// Newest-first page of records, optionally filtered by name.
  pub async fn list(&self, page: Page, name_filter: Option<&str>) -> Result<Listing> {
    let query = AccidentQuery::new(page, name_filter);
    let records = self.store.list(&query).await.map_err(Error::storage)?;
    Ok(Listing { records, page: query.page })
  }

  pub async fn get(&self, raw_id: &str) -> Result<AccidentRecord> {
    let id = parse_id(raw_id)?;
    self
      .store
      .get(id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::NotFound(id))
  }

  /// Validate and insert. Duplicate submissions create duplicate records.
  pub async fn create(&self, candidate: &AccidentCandidate) -> Result<CreatedAccident> {
    let accident = self.check(candidate)?;
    let record = self.store.insert(accident).await.map_err(Error::storage)?;
    Ok(CreatedAccident::from(&record))
  }

  /// Validate and overwrite every user field of an existing record.
  ///
  /// Last write wins; there is no optimistic-lock check.
  pub async fn update(
    &self,
    raw_id: &str,
    candidate: &AccidentCandidate,
  ) -> Result<UpdatedAccident> {
    let id = parse_id(raw_id)?;
    let accident = self.check(candidate)?;
    self
      .store
      .update(id, accident)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::NotFound(id))
  }

  pub async fn delete(&self, raw_id: &str) -> Result<DeletedAccident> {
    let id = parse_id(raw_id)?;
    self
      .store
      .delete(id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::NotFound(id))
  }
}
