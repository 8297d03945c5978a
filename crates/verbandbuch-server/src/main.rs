//! verbandbuch-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) overlaid by
//! `VERBANDBUCH_*` environment variables, opens the SQLite store and serves
//! the JSON API over HTTP.
//!
//! # Sample data
//!
//! ```sh
//! cargo run -p verbandbuch-server -- --seed
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use verbandbuch_core::service::AccidentService;
use verbandbuch_server::{ServerConfig, seed};
use verbandbuch_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Verbandbuch accident log server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Insert the sample records and exit.
  #[arg(long)]
  seed: bool,

  /// Like `--seed`, but delete every existing record first.
  #[arg(long, conflicts_with = "seed")]
  seed_truncate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let mut server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

  if !server_cfg.store.is_in_memory() {
    server_cfg.store.path = expand_tilde(&server_cfg.store.path);
    if let Some(dir) = server_cfg.store.path.parent()
      && !dir.as_os_str().is_empty()
    {
      std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    }
  }

  // Open SQLite store.
  let store = SqliteStore::open(&server_cfg.store)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store.path))?;
  let service = AccidentService::new(Arc::new(store));

  // Helper mode: seed and exit.
  if cli.seed || cli.seed_truncate {
    let report = seed::seed(&service, cli.seed_truncate).await?;
    tracing::info!(
      inserted = report.inserted,
      total = report.total,
      "seeded sample accidents"
    );
    return Ok(());
  }

  let app = verbandbuch_server::app(service, &server_cfg)
    .with_context(|| format!("invalid frontend_url {:?}", server_cfg.frontend_url))?;
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!(frontend = %server_cfg.frontend_url, "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("server stopped");
  Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(error = %e, "failed to listen for ctrl-c");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    () = ctrl_c => {},
    () = terminate => {},
  }
  tracing::info!("shutting down");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
