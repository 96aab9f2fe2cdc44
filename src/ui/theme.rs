use ratatui::style::Color;

use crate::model::card::CardStatus;
use crate::views::DueAlert;

pub const BORDER: Color = Color::Cyan;

pub fn status_color(status: CardStatus) -> Color {
    match status {
        CardStatus::NotStarted => Color::Gray,
        CardStatus::InProgress => Color::Blue,
        CardStatus::Change => Color::Yellow,
        CardStatus::Completed => Color::Green,
    }
}

pub fn alert_color(alert: DueAlert) -> Color {
    match alert {
        DueAlert::Overdue => Color::Red,
        DueAlert::Today => Color::Yellow,
        DueAlert::Tomorrow | DueAlert::Upcoming => Color::Blue,
        DueAlert::Normal => Color::Gray,
    }
}

pub fn label_color(color: Option<&str>) -> Color {
    match color {
        Some("red") => Color::Red,
        Some("orange") => Color::Rgb(0xFF, 0xA5, 0x00),
        Some("yellow") => Color::Yellow,
        Some("green") => Color::Green,
        Some("blue") => Color::Blue,
        Some("purple") => Color::Magenta,
        Some("sky") => Color::Cyan,
        _ => Color::Gray,
    }
}
