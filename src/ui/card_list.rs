use chrono::Utc;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::app::App;
use crate::ui::theme::{alert_color, status_color, BORDER};
use crate::views::{due_alert, DueAlert};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let now = Utc::now();
    let cards = app.visible_cards();

    let items: Vec<ListItem> = cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            let selected = i == app.selected_card;

            let status_span = Span::styled(
                format!("{} ", card.local_status.icon()),
                Style::default().fg(status_color(card.local_status)),
            );

            let max_name = area.width.saturating_sub(24) as usize;
            let name: String = card.name.chars().take(max_name).collect();
            let name_style = if selected {
                Style::default()
                    .fg(ratatui::style::Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let name_span = Span::styled(name, name_style);

            let mut spans = vec![status_span, name_span];

            if let Some(due) = card.due {
                let alert = due_alert(Some(&due), now);
                if alert != DueAlert::Normal {
                    spans.push(Span::styled(
                        format!(" [{}]", alert.tag(due, now)),
                        Style::default().fg(alert_color(alert)),
                    ));
                }
            }

            if let Some(responsible) = &card.responsible {
                spans.push(Span::styled(
                    format!(" @{}", responsible.username),
                    Style::default().fg(ratatui::style::Color::DarkGray),
                ));
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    let board_name = app
        .service
        .board
        .as_ref()
        .map(|b| b.name.as_str())
        .unwrap_or("Board");
    let title = if app.service.is_syncing() {
        format!(" {board_name} (syncing...) ")
    } else if app.filters.is_active() {
        format!(
            " {board_name} ({}/{} cards) ",
            cards.len(),
            app.service.cards.len()
        )
    } else {
        format!(" {board_name} ({} cards) ", cards.len())
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER))
            .title(title),
    );

    f.render_widget(list, area);
}
