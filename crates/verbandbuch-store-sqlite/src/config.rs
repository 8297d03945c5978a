//! Store configuration, deserialised from the server's config file.

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

/// Path value that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// SQLite database file, or `:memory:`.
  #[serde(default = "default_path")]
  pub path:               PathBuf,
  /// Upper bound on concurrently outstanding storage operations.
  /// In-memory stores always use a single connection.
  #[serde(default = "default_max_connections")]
  pub max_connections:    usize,
  /// How long a request may wait for a free connection.
  #[serde(default = "default_acquire_timeout_ms")]
  pub acquire_timeout_ms: u64,
  /// How long SQLite retries a locked database before failing.
  #[serde(default = "default_busy_timeout_ms")]
  pub busy_timeout_ms:    u64,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      path:               default_path(),
      max_connections:    default_max_connections(),
      acquire_timeout_ms: default_acquire_timeout_ms(),
      busy_timeout_ms:    default_busy_timeout_ms(),
    }
  }
}

impl StoreConfig {
  pub fn in_memory() -> Self {
    Self {
      path: PathBuf::from(IN_MEMORY),
      ..Self::default()
    }
  }

  pub fn is_in_memory(&self) -> bool { self.path.as_os_str() == IN_MEMORY }

  pub fn acquire_timeout(&self) -> Duration { Duration::from_millis(self.acquire_timeout_ms) }
}

fn default_path() -> PathBuf { PathBuf::from("verbandbuch.db") }

fn default_max_connections() -> usize { 8 }

fn default_acquire_timeout_ms() -> u64 { 5_000 }

fn default_busy_timeout_ms() -> u64 { 5_000 }
