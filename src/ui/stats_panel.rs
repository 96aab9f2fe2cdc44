use chrono::Utc;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::model::card::CardStatus;
use crate::ui::theme::{status_color, BORDER};
use crate::views::{card_stats, UNASSIGNED};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let cards = app.visible_cards();
    let stats = card_stats(&cards, Utc::now());
    let gray = Style::default().fg(ratatui::style::Color::Gray);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("Total: ", gray),
        Span::raw(stats.total.to_string()),
        Span::styled("   overdue ", gray),
        Span::styled(
            stats.overdue.to_string(),
            Style::default().fg(ratatui::style::Color::Red),
        ),
        Span::styled("   today ", gray),
        Span::styled(
            stats.today.to_string(),
            Style::default().fg(ratatui::style::Color::Yellow),
        ),
        Span::styled("   this week ", gray),
        Span::raw(stats.this_week.to_string()),
    ]));
    lines.push(Line::raw(""));

    for status in CardStatus::ALL {
        let count = stats.by_status.get(&status).copied().unwrap_or(0);
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} {:<18}", status.icon(), status.label()),
                Style::default().fg(status_color(status)),
            ),
            Span::raw(count.to_string()),
        ]));
    }
    lines.push(Line::raw(""));

    // Responsible groups, busiest first, unassigned last
    let mut groups: Vec<_> = stats.by_responsible.values().collect();
    groups.sort_by(|a, b| {
        (a.id == UNASSIGNED)
            .cmp(&(b.id == UNASSIGNED))
            .then(b.count.cmp(&a.count))
            .then(a.name.cmp(&b.name))
    });
    for group in groups {
        lines.push(Line::from(vec![
            Span::raw(format!("{:<24}", group.name)),
            Span::raw(group.count.to_string()),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER))
            .title(" By status / responsible "),
    );

    f.render_widget(paragraph, area);
}
