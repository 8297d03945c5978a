//! SQLite backend for the Verbandbuch record store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on dedicated threads
//! without blocking the async runtime. Access goes through a bounded
//! [`Pool`] of connections.

mod config;
mod encode;
mod pool;
mod schema;
mod store;

pub mod error;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use pool::{Pool, PooledConnection};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
