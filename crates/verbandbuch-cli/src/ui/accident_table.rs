//! Accident table pane.

use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  text::Line,
  widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};
use verbandbuch_core::validate::{format_display_date, format_time};

use crate::app::{App, SortField};

/// Render the current page into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let records = app.sorted_records();

  let mut title = format!(" Unfälle · Seite {} ", app.page.number);
  if !app.search.is_empty() {
    title.push_str(&format!("· Suche \"{}\" ", app.search));
  }
  if app.has_more {
    title.push_str("· weitere mit n ");
  }

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Search bar on the last inner line while typing.
  if app.search_active && inner_area.height > 2 {
    let search_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);
    f.render_widget(
      Paragraph::new(format!("/{}_", app.search_input)).style(Style::default().fg(Color::Yellow)),
      search_area,
    );
  }

  if records.is_empty() {
    let text = if app.search.is_empty() {
      "Keine Unfälle erfasst."
    } else {
      "Keine Treffer."
    };
    f.render_widget(
      Paragraph::new(Line::from(text)).style(Style::default().fg(Color::DarkGray)),
      inner_area,
    );
    return;
  }

  let header = Row::new(vec![
    Cell::from(heading(app, "Name", Some(SortField::Name))),
    Cell::from(heading(app, "Unfall-Datum", Some(SortField::UnfallDatum))),
    Cell::from(heading(app, "Zeit", None)),
    Cell::from(heading(app, "Ort", Some(SortField::Ort))),
    Cell::from(heading(app, "Verletzung", None)),
    Cell::from(heading(app, "Ersthelfer", None)),
  ])
  .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

  let rows = records.iter().map(|r| {
    let a = &r.accident;
    Row::new(vec![
      Cell::from(a.name_verletzte_person.clone()),
      Cell::from(format_display_date(a.unfall_datum)),
      Cell::from(format_time(a.unfall_uhrzeit)),
      Cell::from(a.ort.clone()),
      Cell::from(a.art_der_verletzung.clone()),
      Cell::from(a.ersthelfer_name.clone()),
    ])
  });

  let widths = [
    Constraint::Percentage(22),
    Constraint::Length(14),
    Constraint::Length(6),
    Constraint::Percentage(20),
    Constraint::Percentage(22),
    Constraint::Percentage(18),
  ];

  let mut state = TableState::default().with_selected(Some(app.cursor));
  f.render_stateful_widget(
    Table::new(rows, widths).header(header).row_highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}

/// Column title with the sort indicator: `↕` when sortable but inactive.
fn heading(app: &App, title: &str, field: Option<SortField>) -> String {
  match field {
    Some(field) if field == app.sort_field => format!("{title} {}", app.sort_dir.arrow()),
    Some(_) => format!("{title} ↕"),
    None => title.to_string(),
  }
}
