//! `verbandbuch`: terminal client for the Verbandbuch accident log.
//!
//! # Usage
//!
//! ```text
//! verbandbuch report --name "Max Mustermann" --unfall-datum 01.10.2024 ...
//! verbandbuch show 4
//! verbandbuch --url http://localhost:3001 admin
//! ```

mod app;
mod client;
mod display;
mod form;
mod ui;

use std::{
  io::{self, BufRead, Write},
  path::PathBuf,
  time::Duration,
};

use anyhow::{Context, Result, bail};
use app::App;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig, ClientError};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use form::FormArgs;
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use verbandbuch_core::{record::AccidentCandidate, service::local_today};

const DEFAULT_URL: &str = "http://localhost:3001";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "verbandbuch", about = "Terminal client for the Verbandbuch accident log")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the Verbandbuch server (default: http://localhost:3001).
  #[arg(long, env = "VERBANDBUCH_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Report a new accident. Every field is required.
  Report(FormArgs),

  /// Change an existing accident. Only the given fields are replaced.
  Edit {
    id: i64,
    #[command(flatten)]
    form: FormArgs,
  },

  /// Print one accident.
  Show { id: i64 },

  /// Delete one accident after confirmation.
  Delete {
    id: i64,
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
  },

  /// Open the admin dashboard (default).
  Admin,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Logs go to stderr; the dashboard owns stdout.
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
  };
  let client = ApiClient::new(api_config)?;

  match args.command.unwrap_or(Command::Admin) {
    Command::Report(form) => report(&client, &form).await,
    Command::Edit { id, form } => edit(&client, id, &form).await,
    Command::Show { id } => show(&client, id).await,
    Command::Delete { id, yes } => delete(&client, id, yes).await,
    Command::Admin => admin(client).await,
  }
}

// ─── One-shot commands ────────────────────────────────────────────────────────

async fn report(client: &ApiClient, form: &FormArgs) -> Result<()> {
  let candidate = checked(form.apply(AccidentCandidate::default()))?;
  let reply = client.create(&candidate).await.map_err(explain)?;
  println!(
    "{} (ID {})",
    reply.message.as_deref().unwrap_or("Unfall gemeldet"),
    reply.data.id
  );
  Ok(())
}

async fn edit(client: &ApiClient, id: i64, form: &FormArgs) -> Result<()> {
  if form.is_empty() {
    bail!("keine Änderungen angegeben");
  }
  let current = client.get(id).await.map_err(explain)?;
  let candidate = checked(form.apply(current.accident.to_candidate()))?;
  let reply = client.update(id, &candidate).await.map_err(explain)?;
  println!(
    "{} (ID {})",
    reply.message.as_deref().unwrap_or("Unfall aktualisiert"),
    reply.data.id
  );
  Ok(())
}

async fn show(client: &ApiClient, id: i64) -> Result<()> {
  let record = client.get(id).await.map_err(explain)?;
  let rows = display::detail_rows(&record);
  let width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
  for (label, value) in rows {
    println!("{label:<width$}  {value}");
  }
  Ok(())
}

async fn delete(client: &ApiClient, id: i64, yes: bool) -> Result<()> {
  let record = client.get(id).await.map_err(explain)?;
  let name = &record.accident.name_verletzte_person;

  if !yes {
    print!("Unfall von {name} ({}) wirklich löschen? [j/N] ", display::accident_when(&record));
    io::stdout().flush().ok();
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    if !matches!(line.trim(), "j" | "J" | "y" | "Y") {
      println!("Abgebrochen.");
      return Ok(());
    }
  }

  let reply = client.delete(id).await.map_err(explain)?;
  println!(
    "{}: {}",
    reply.message.as_deref().unwrap_or("Unfall gelöscht"),
    reply.data.name_verletzte_person
  );
  Ok(())
}

/// Validate locally against today's date; print field errors and fail
/// without contacting the server.
fn checked(candidate: AccidentCandidate) -> Result<AccidentCandidate> {
  form::check(&candidate, local_today()).or_else(|errors| {
    eprintln!("Bitte die markierten Felder korrigieren:");
    form::print_field_errors(errors.iter().map(|(f, m)| (f.label(), m)));
    bail!("{} Feld(er) ungültig", errors.len())
  })
}

/// Print server-side field errors, then hand the error on.
fn explain(err: ClientError) -> anyhow::Error {
  let fields = err.field_messages();
  if !fields.is_empty() {
    form::print_field_errors(fields);
  }
  err.into()
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

async fn admin(client: ApiClient) -> Result<()> {
  let mut app = App::new(client);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Load initial data; failures show in the status bar.
  app.load().await;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      if !app.handle_key(key).await? {
        break;
      }
    }
  }

  Ok(())
}
