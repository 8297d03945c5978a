//! The `AccidentStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `verbandbuch-store-sqlite`). The record service depends on this
//! abstraction, not on any concrete backend, so tests can swap in an isolated
//! store per run.

use std::future::Future;

use crate::{
  query::AccidentQuery,
  record::{AccidentRecord, DeletedAccident, NewAccident, UpdatedAccident},
};

/// Durable storage for accident records.
///
/// The store assigns ids (unique, never reused) and timestamps. It does not
/// validate; every value a caller hands it is written as-is. Each operation
/// touches exactly one row or one ordered slice of rows.
pub trait AccidentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert a new row, assigning `id` and `created_at`.
  fn insert(
    &self,
    accident: NewAccident,
  ) -> impl Future<Output = Result<AccidentRecord, Self::Error>> + Send + '_;

  /// Fetch a row by id. Returns `None` if not found.
  fn get(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<AccidentRecord>, Self::Error>> + Send + '_;

  /// Rows matching `query.name_filter`, newest first, sliced by `query.page`.
  fn list<'a>(
    &'a self,
    query: &'a AccidentQuery,
  ) -> impl Future<Output = Result<Vec<AccidentRecord>, Self::Error>> + Send + 'a;

  /// Overwrite every user field of row `id` and refresh `updated_at`.
  /// Returns `None` if no such row exists.
  fn update(
    &self,
    id: i64,
    accident: NewAccident,
  ) -> impl Future<Output = Result<Option<UpdatedAccident>, Self::Error>> + Send + '_;

  /// Hard-delete row `id`. Returns `None` if no such row exists.
  fn delete(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<DeletedAccident>, Self::Error>> + Send + '_;
}
