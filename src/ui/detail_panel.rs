use chrono::Utc;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::theme::{alert_color, label_color, status_color, BORDER};
use crate::views::due_alert;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER))
        .title(" Details ");

    let card = match app.selected() {
        Some(card) => card,
        None => {
            f.render_widget(block, area);
            return;
        }
    };

    let gray = Style::default().fg(ratatui::style::Color::Gray);
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("Status: ", gray),
        Span::styled(
            card.local_status.label(),
            Style::default().fg(status_color(card.local_status)),
        ),
    ]));

    if let Some(due) = card.due {
        let now = Utc::now();
        let alert = due_alert(Some(&due), now);
        lines.push(Line::from(vec![
            Span::styled("Due: ", gray),
            Span::raw(due.format("%Y-%m-%d %H:%M").to_string()),
            Span::styled(
                format!(" {}", alert.tag(due, now)),
                Style::default().fg(alert_color(alert)),
            ),
        ]));
    }

    if let Some(responsible) = &card.responsible {
        lines.push(Line::from(vec![
            Span::styled("Responsible: ", gray),
            Span::raw(format!(
                "{} (@{})",
                responsible.full_name, responsible.username
            )),
        ]));
    }

    if card.members.len() > 1 {
        let others: Vec<&str> = card
            .members
            .iter()
            .skip(1)
            .map(|m| m.username.as_str())
            .collect();
        lines.push(Line::from(vec![
            Span::styled("Also assigned: ", gray),
            Span::raw(others.join(", ")),
        ]));
    }

    if !card.labels.is_empty() {
        let mut spans = vec![Span::styled("Labels: ", gray)];
        for (i, label) in card.labels.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(", "));
            }
            spans.push(Span::styled(
                label.name.clone(),
                Style::default().fg(label_color(label.color.as_deref())),
            ));
        }
        lines.push(Line::from(spans));
    }

    if let Some(activity) = card.last_activity {
        lines.push(Line::from(vec![
            Span::styled("Last activity: ", gray),
            Span::raw(activity.format("%Y-%m-%d").to_string()),
        ]));
    }

    if let Some(url) = &card.url {
        lines.push(Line::from(vec![
            Span::styled("URL: ", gray),
            Span::styled(url.clone(), Style::default().fg(ratatui::style::Color::Blue)),
        ]));
    }

    if let Some(desc) = &card.description {
        lines.push(Line::raw(""));
        let truncated: String = desc.chars().take(500).collect();
        lines.push(Line::raw(truncated));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}
