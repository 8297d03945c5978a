//! Accident detail pane: right panel.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};
use verbandbuch_core::record::AccidentRecord;

use crate::{app::App, display::detail_rows};

/// Render every field of `record` into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App, record: &AccidentRecord) {
  let block = Block::default()
    .title(format!(" {} ", record.accident.name_verletzte_person))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut lines: Vec<Line> = Vec::new();
  for (label, value) in detail_rows(record) {
    lines.push(Line::from(Span::styled(
      label,
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("  {value}")));
  }

  let para = Paragraph::new(lines)
    .wrap(Wrap { trim: false })
    .scroll((app.detail_scroll, 0));
  f.render_widget(para, inner);
}
