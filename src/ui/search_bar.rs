use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::theme::BORDER;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::styled("/ ", Style::default().fg(ratatui::style::Color::Yellow)),
        Span::raw(app.filters.search.as_str()),
        Span::styled("▏", Style::default().fg(ratatui::style::Color::DarkGray)),
    ]);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER))
            .title(" Search (enter to keep, esc to clear) "),
    );

    f.render_widget(paragraph, area);
}
