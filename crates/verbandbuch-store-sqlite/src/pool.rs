//! A bounded pool of SQLite connections.
//!
//! Each [`tokio_rusqlite::Connection`] owns a background thread. The pool
//! caps how many storage operations are outstanding at once: callers beyond
//! capacity queue on a semaphore and give up after `acquire_timeout`.
//! Connections go back to the pool when the [`PooledConnection`] guard drops.

use std::{
  ops::Deref,
  sync::{Mutex, PoisonError},
  time::Duration,
};

use rusqlite::functions::FunctionFlags;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio_rusqlite::Connection;

use crate::{
  Error, Result,
  config::StoreConfig,
  schema::{SCHEMA, connection_pragmas},
};

pub struct Pool {
  idle:            Mutex<Vec<Connection>>,
  permits:         Semaphore,
  size:            usize,
  acquire_timeout: Duration,
}

impl Pool {
  /// Open `config.max_connections` connections (one for `:memory:`) and
  /// initialise the schema.
  pub async fn open(config: &StoreConfig) -> Result<Self> {
    if config.max_connections == 0 {
      return Err(Error::Config("max_connections must be at least 1".into()));
    }

    let in_memory = config.is_in_memory();
    // Every in-memory connection would be a separate database.
    let size = if in_memory { 1 } else { config.max_connections };

    let mut conns = Vec::with_capacity(size);
    for _ in 0..size {
      let conn = if in_memory {
        Connection::open_in_memory().await?
      } else {
        Connection::open(&config.path).await?
      };
      configure(&conn, config.busy_timeout_ms, !in_memory).await?;
      conns.push(conn);
    }

    if let Some(first) = conns.first() {
      first
        .call(|conn| {
          conn.execute_batch(SCHEMA)?;
          Ok(())
        })
        .await?;
    }

    tracing::debug!(
      path = %config.path.display(),
      connections = size,
      "opened sqlite connection pool"
    );

    Ok(Self {
      idle: Mutex::new(conns),
      permits: Semaphore::new(size),
      size,
      acquire_timeout: config.acquire_timeout(),
    })
  }

  /// Wait for a free connection, at most `acquire_timeout`.
  pub async fn acquire(&self) -> Result<PooledConnection<'_>> {
    let permit = tokio::time::timeout(self.acquire_timeout, self.permits.acquire())
      .await
      .map_err(|_| Error::PoolTimeout(self.acquire_timeout))?
      .map_err(|_| Error::PoolClosed)?;

    let conn = self
      .idle
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .pop()
      .ok_or(Error::PoolClosed)?;

    Ok(PooledConnection {
      pool:    self,
      conn,
      _permit: permit,
    })
  }

  /// Total number of connections.
  pub fn size(&self) -> usize { self.size }

  /// Connections not currently checked out.
  pub fn available(&self) -> usize { self.permits.available_permits() }
}

/// A connection checked out of a [`Pool`]. Returned on drop.
pub struct PooledConnection<'a> {
  pool:    &'a Pool,
  conn:    Connection,
  // Released after `conn` is back in the idle list.
  _permit: SemaphorePermit<'a>,
}

impl Deref for PooledConnection<'_> {
  type Target = Connection;

  fn deref(&self) -> &Connection { &self.conn }
}

impl Drop for PooledConnection<'_> {
  fn drop(&mut self) {
    // Handles are reference-counted; the clone keeps the same worker thread.
    self
      .pool
      .idle
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(self.conn.clone());
  }
}

async fn configure(conn: &Connection, busy_timeout_ms: u64, wal: bool) -> Result<()> {
  let pragmas = connection_pragmas(busy_timeout_ms, wal);
  conn
    .call(move |conn| {
      conn.execute_batch(&pragmas)?;
      // Unicode-aware lowercase; SQLite's own lower() only folds ASCII.
      conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
      )?;
      Ok(())
    })
    .await?;
  Ok(())
}
