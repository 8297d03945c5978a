//! Error type for `verbandbuch-store-sqlite`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("timed out after {0:?} waiting for a database connection")]
  PoolTimeout(Duration),

  #[error("connection pool is closed")]
  PoolClosed,

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("invalid store configuration: {0}")]
  Config(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
