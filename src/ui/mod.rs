pub mod card_list;
pub mod detail_panel;
pub mod footer;
pub mod search_bar;
pub mod stats_panel;
pub mod theme;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::{App, ViewMode};

pub fn render(f: &mut Frame, app: &App) {
    let size = f.area();

    let bottom_height = if app.search_active { 3 } else { 1 };
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(bottom_height)])
        .split(size);

    let main_area = vertical[0];
    let bottom_area = vertical[1];

    match app.view_mode {
        ViewMode::List => {
            // Cards (60%) + Detail (40%)
            let horizontal = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(main_area);
            card_list::render(f, horizontal[0], app);
            detail_panel::render(f, horizontal[1], app);
        }
        ViewMode::Grouped => {
            stats_panel::render(f, main_area, app);
        }
    }

    if app.search_active {
        search_bar::render(f, bottom_area, app);
    } else {
        footer::render(f, bottom_area, app);
    }
}
