//! Error types for `verbandbuch-core`.

use thiserror::Error;

use crate::validate::FieldErrors;

/// Failure outcome of a record service operation.
#[derive(Debug, Error)]
pub enum Error {
  /// The supplied id is not a positive integer.
  #[error("invalid id: {0:?}")]
  InvalidId(String),

  #[error("validation failed: {0}")]
  Validation(FieldErrors),

  #[error("accident {0} not found")]
  NotFound(i64),

  /// Any backend failure: connectivity, pool exhaustion, constraint
  /// violations. Not distinguished further.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn storage<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
