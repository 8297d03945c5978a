//! Dashboard state machine and event dispatcher.
//!
//! Key handling is split in two: [`App::on_key`] updates local state and
//! returns the [`Action`] that needs the network, [`App::handle_key`] runs
//! it. Only the latter talks to the server.

use std::{cmp::Ordering, sync::Arc};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use verbandbuch_core::{query::Page, record::AccidentRecord};

use crate::client::ApiClient;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the accident table.
  Table,
  /// Focus on the detail pane of the selected record.
  Detail,
  /// Waiting for j/n before deleting the selected record.
  ConfirmDelete,
}

// ─── Sorting ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
  Name,
  UnfallDatum,
  Ort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
  Asc,
  Desc,
}

impl SortDirection {
  pub fn flip(self) -> Self {
    match self {
      SortDirection::Asc => SortDirection::Desc,
      SortDirection::Desc => SortDirection::Asc,
    }
  }

  pub fn arrow(self) -> &'static str {
    match self {
      SortDirection::Asc => "↑",
      SortDirection::Desc => "↓",
    }
  }
}

/// Order `records` in place by `field`. Text compares case-insensitively;
/// the accident date breaks ties by time of day.
pub fn sort_records(records: &mut [&AccidentRecord], field: SortField, dir: SortDirection) {
  records.sort_by(|a, b| {
    let ord = compare(a, b, field);
    match dir {
      SortDirection::Asc => ord,
      SortDirection::Desc => ord.reverse(),
    }
  });
}

fn compare(a: &AccidentRecord, b: &AccidentRecord, field: SortField) -> Ordering {
  let (a, b) = (&a.accident, &b.accident);
  match field {
    SortField::Name => a
      .name_verletzte_person
      .to_lowercase()
      .cmp(&b.name_verletzte_person.to_lowercase()),
    SortField::UnfallDatum => {
      (a.unfall_datum, a.unfall_uhrzeit).cmp(&(b.unfall_datum, b.unfall_uhrzeit))
    }
    SortField::Ort => a.ort.to_lowercase().cmp(&b.ort.to_lowercase()),
  }
}

// ─── Actions ──────────────────────────────────────────────────────────────────

/// Follow-up work requested by a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  None,
  Quit,
  /// Fetch the current page again.
  Reload,
  Delete { id: i64, name: String },
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level dashboard state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// The current page, in server order.
  pub records: Vec<AccidentRecord>,

  /// Effective page as echoed by the server.
  pub page: Page,

  /// Whether the last page came back full, so a next one may exist.
  pub has_more: bool,

  /// The applied server-side name filter.
  pub search: String,

  /// Text being typed into the search bar (only while `search_active`).
  pub search_input: String,
  pub search_active: bool,

  pub sort_field: SortField,
  pub sort_dir:   SortDirection,

  /// Cursor position within the *sorted* page.
  pub cursor: usize,

  /// Scroll offset within the detail pane.
  pub detail_scroll: u16,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::Table,
      records: Vec::new(),
      page: Page::default(),
      has_more: false,
      search: String::new(),
      search_input: String::new(),
      search_active: false,
      sort_field: SortField::UnfallDatum,
      sort_dir: SortDirection::Desc,
      cursor: 0,
      detail_scroll: 0,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch the current page. Failures land in the status bar.
  pub async fn load(&mut self) {
    self.status_msg = "Lade Unfälle…".into();
    let search = (!self.search.is_empty()).then_some(self.search.as_str());
    match self.client.list(self.page, search).await {
      Ok(listing) => {
        self.has_more = listing.may_have_more();
        self.page = listing.page;
        self.records = listing.records;
        self.cursor = self.cursor.min(self.records.len().saturating_sub(1));
        self.status_msg.clear();
      }
      Err(e) => {
        tracing::debug!(error = ?e, "list failed");
        self.status_msg = e.to_string();
      }
    }
  }

  async fn delete(&mut self, id: i64, name: &str) {
    match self.client.delete(id).await {
      Ok(reply) => {
        // Step back if the page just emptied.
        if self.records.len() == 1 && self.page.number > 1 {
          self.page = self.page.prev();
        }
        self.load().await;
        self.status_msg = reply
          .message
          .map_or_else(|| format!("Unfall von {name} gelöscht"), |m| format!("{m}: {name}"));
      }
      Err(e) => self.status_msg = e.to_string(),
    }
  }

  // ── Sorted view ───────────────────────────────────────────────────────────

  /// The current page in display order.
  pub fn sorted_records(&self) -> Vec<&AccidentRecord> {
    let mut view: Vec<_> = self.records.iter().collect();
    sort_records(&mut view, self.sort_field, self.sort_dir);
    view
  }

  /// The record under the cursor, if any.
  pub fn selected(&self) -> Option<&AccidentRecord> {
    self.sorted_records().get(self.cursor).copied()
  }

  /// Click-a-column semantics: a new field sorts ascending, the same field
  /// flips direction.
  pub fn sort_by(&mut self, field: SortField) {
    if self.sort_field == field {
      self.sort_dir = self.sort_dir.flip();
    } else {
      self.sort_field = field;
      self.sort_dir = SortDirection::Asc;
    }
    self.cursor = 0;
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match self.on_key(key) {
      Action::None => {}
      Action::Quit => return Ok(false),
      Action::Reload => self.load().await,
      Action::Delete { id, name } => self.delete(id, &name).await,
    }
    Ok(true)
  }

  /// Apply `key` to local state and return the follow-up, if any.
  pub fn on_key(&mut self, key: KeyEvent) -> Action {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Action::Quit;
    }

    if self.search_active {
      return self.on_search_key(key);
    }

    match self.screen {
      Screen::Table => self.on_table_key(key),
      Screen::Detail => self.on_detail_key(key),
      Screen::ConfirmDelete => self.on_confirm_key(key),
    }
  }

  fn on_search_key(&mut self, key: KeyEvent) -> Action {
    match key.code {
      KeyCode::Esc => {
        self.search_active = false;
        self.search_input.clear();
      }
      KeyCode::Enter => {
        self.search_active = false;
        self.search = self.search_input.trim().to_owned();
        self.page = Page::new(1, self.page.size);
        self.cursor = 0;
        return Action::Reload;
      }
      KeyCode::Backspace => {
        self.search_input.pop();
      }
      KeyCode::Char(c) => self.search_input.push(c),
      _ => {}
    }
    Action::None
  }

  fn on_table_key(&mut self, key: KeyEvent) -> Action {
    match key.code {
      KeyCode::Char('q') => return Action::Quit,

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.records.len() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.cursor = self.cursor.saturating_sub(1);
      }

      // Paging
      KeyCode::Char('n') | KeyCode::PageDown => {
        if self.has_more {
          self.page = self.page.next();
          self.cursor = 0;
          return Action::Reload;
        }
      }
      KeyCode::Char('p') | KeyCode::PageUp => {
        if self.page.number > 1 {
          self.page = self.page.prev();
          self.cursor = 0;
          return Action::Reload;
        }
      }
      KeyCode::Char('r') => return Action::Reload,

      // Sorting
      KeyCode::Char('1') => self.sort_by(SortField::Name),
      KeyCode::Char('2') => self.sort_by(SortField::UnfallDatum),
      KeyCode::Char('3') => self.sort_by(SortField::Ort),
      KeyCode::Char('s') => self.sort_dir = self.sort_dir.flip(),

      // Search
      KeyCode::Char('/') => {
        self.search_active = true;
        self.search_input = self.search.clone();
      }
      KeyCode::Esc if !self.search.is_empty() => {
        self.search.clear();
        self.page = Page::new(1, self.page.size);
        self.cursor = 0;
        return Action::Reload;
      }

      // Detail / delete
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if self.selected().is_some() {
          self.detail_scroll = 0;
          self.screen = Screen::Detail;
        }
      }
      KeyCode::Char('d') | KeyCode::Delete => self.ask_delete(),

      _ => {}
    }
    Action::None
  }

  fn on_detail_key(&mut self, key: KeyEvent) -> Action {
    match key.code {
      KeyCode::Char('q') => return Action::Quit,
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.screen = Screen::Table,
      KeyCode::Down | KeyCode::Char('j') => {
        self.detail_scroll = self.detail_scroll.saturating_add(1);
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
      }
      KeyCode::Char(']') => {
        if self.cursor + 1 < self.records.len() {
          self.cursor += 1;
          self.detail_scroll = 0;
        }
      }
      KeyCode::Char('[') => {
        self.cursor = self.cursor.saturating_sub(1);
        self.detail_scroll = 0;
      }
      KeyCode::Char('d') | KeyCode::Delete => self.ask_delete(),
      _ => {}
    }
    Action::None
  }

  fn on_confirm_key(&mut self, key: KeyEvent) -> Action {
    match key.code {
      KeyCode::Char('j') | KeyCode::Char('y') => {
        self.screen = Screen::Table;
        if let Some(r) = self.selected() {
          return Action::Delete { id: r.id, name: r.accident.name_verletzte_person.clone() };
        }
      }
      KeyCode::Char('n') | KeyCode::Esc => {
        self.screen = Screen::Table;
        self.status_msg.clear();
      }
      _ => {}
    }
    Action::None
  }

  fn ask_delete(&mut self) {
    if let Some(name) = self.selected().map(|r| r.accident.name_verletzte_person.clone()) {
      self.status_msg = format!("Unfall von {name} wirklich löschen? [j/n]");
      self.screen = Screen::ConfirmDelete;
    }
  }
}
