use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, ViewMode};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();

    match &app.view_mode {
        ViewMode::List => {
            spans.push(hint("↑↓", "navigate"));
            spans.push(hint("s", "status"));
            spans.push(hint("/", "search"));
            spans.push(hint("1-8", "filter"));
            spans.push(hint("v", "sort"));
            spans.push(hint("g", "groups"));
            spans.push(hint("r", "sync"));
            spans.push(hint("q", "quit"));
        }
        ViewMode::Grouped => {
            spans.push(hint("g", "list"));
            spans.push(hint("1-8", "filter"));
            spans.push(hint("c", "clear filters"));
            spans.push(hint("r", "sync"));
            spans.push(hint("q", "quit"));
        }
    }

    // Active filter indicator
    let active = app.filters.active_count();
    if active > 0 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!(" {active} filters "),
            Style::default()
                .fg(ratatui::style::Color::Black)
                .bg(ratatui::style::Color::Cyan),
        ));
    }

    if let Some(last_sync) = app.service.last_sync {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("synced {}", last_sync.format("%H:%M")),
            Style::default().fg(ratatui::style::Color::DarkGray),
        ));
    }

    // Flash message
    if let Some((msg, _)) = &app.flash_message {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            msg,
            Style::default().fg(ratatui::style::Color::Yellow),
        ));
    } else if let Some(err) = &app.service.error {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            err,
            Style::default().fg(ratatui::style::Color::Red),
        ));
    }

    let line = Line::from(spans);
    let paragraph = Paragraph::new(line);
    f.render_widget(paragraph, area);
}

fn hint(key: &str, desc: &str) -> Span<'static> {
    Span::styled(
        format!(" {key}:{desc} "),
        Style::default().fg(ratatui::style::Color::DarkGray),
    )
}
