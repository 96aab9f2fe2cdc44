use std::time::Instant;

use chrono::Utc;
use tokio::sync::mpsc;

use crate::event::KeyAction;
use crate::model::card::{Card, CardStatus};
use crate::model::filter::{filter_cards, DueBucket, FilterState};
use crate::sync::SyncService;
use crate::views::{self, SortKey, SortOrder};

#[derive(Debug, Clone)]
pub enum Action {
    Key(KeyAction),
    Tick,
    /// Scheduled unforced sync from the auto-sync timer.
    AutoSync(String),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    List,
    Grouped,
}

pub struct App {
    pub service: SyncService,
    pub board_id: Option<String>,
    pub filters: FilterState,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pub view_mode: ViewMode,
    pub selected_card: usize,
    pub search_active: bool,
    pub flash_message: Option<(String, Instant)>,
    pub should_quit: bool,
    pub action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        service: SyncService,
        board_id: Option<String>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            service,
            board_id,
            filters: FilterState::default(),
            sort_key: SortKey::DueDate,
            sort_order: SortOrder::Asc,
            view_mode: ViewMode::List,
            selected_card: 0,
            search_active: false,
            flash_message: None,
            should_quit: false,
            action_tx,
        }
    }

    /// Current filtered + sorted view of the merged card list.
    pub fn visible_cards(&self) -> Vec<&Card> {
        let now = Utc::now();
        let filtered = filter_cards(&self.service.cards, &self.filters, now);
        views::sort_cards(filtered, self.sort_key, self.sort_order, now)
    }

    pub fn selected(&self) -> Option<&Card> {
        self.visible_cards().get(self.selected_card).copied()
    }

    pub async fn update(&mut self, action: Action) {
        // Clear flash message after 3 seconds
        if let Some((_, t)) = &self.flash_message {
            if t.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }

        match action {
            Action::Key(key) => self.handle_key(key).await,
            Action::Tick => {}
            Action::AutoSync(board_id) => {
                if let Err(e) = self.service.sync(&board_id, false).await {
                    self.flash(format!("Sync failed: {e}"));
                }
                self.clamp_selection();
            }
            Action::Quit => {
                self.should_quit = true;
            }
        }
    }

    async fn handle_key(&mut self, key: KeyAction) {
        match key {
            KeyAction::Up => {
                if self.selected_card > 0 {
                    self.selected_card -= 1;
                }
            }
            KeyAction::Down => {
                let len = self.visible_cards().len();
                if len > 0 && self.selected_card < len - 1 {
                    self.selected_card += 1;
                }
            }
            KeyAction::Select => {
                if self.search_active {
                    self.search_active = false;
                }
            }
            KeyAction::Escape => {
                if self.search_active {
                    self.search_active = false;
                    self.filters.search.clear();
                    self.clamp_selection();
                }
            }
            KeyAction::Backspace => {
                if self.search_active {
                    self.filters.search.pop();
                    self.clamp_selection();
                }
            }
            KeyAction::Char(c) => {
                if self.search_active {
                    self.filters.search.push(c);
                    self.clamp_selection();
                } else {
                    self.handle_command(c).await;
                }
            }
        }
    }

    async fn handle_command(&mut self, c: char) {
        match c {
            'q' => self.should_quit = true,
            '/' => self.search_active = true,
            'r' => self.force_sync().await,
            's' => self.cycle_selected_status().await,
            'g' => {
                self.view_mode = match self.view_mode {
                    ViewMode::List => ViewMode::Grouped,
                    ViewMode::Grouped => ViewMode::List,
                };
            }
            'v' => {
                self.sort_key = self.sort_key.next();
                self.flash(format!("Sort: {}", self.sort_key.label()));
            }
            'V' => {
                self.sort_order = self.sort_order.toggled();
            }
            'c' => {
                self.filters.clear();
                self.clamp_selection();
                self.flash("Filters cleared".into());
            }
            '1'..='4' => {
                let idx = c as usize - '1' as usize;
                self.filters.toggle_status(CardStatus::ALL[idx]);
                self.clamp_selection();
            }
            '5'..='8' => {
                let idx = c as usize - '5' as usize;
                self.filters.toggle_due(DueBucket::ALL[idx]);
                self.clamp_selection();
            }
            _ => {}
        }
    }

    async fn force_sync(&mut self) {
        let board_id = match &self.board_id {
            Some(id) => id.clone(),
            None => {
                self.flash("No board configured".into());
                return;
            }
        };
        match self.service.sync(&board_id, true).await {
            Ok(_) => self.flash("Synced".into()),
            Err(e) => self.flash(format!("Sync failed: {e}")),
        }
        self.clamp_selection();
    }

    /// Advances the selected card to the next workflow status. The user's
    /// explicit action must not be lost silently, so failures surface in the
    /// flash line.
    async fn cycle_selected_status(&mut self) {
        let (card_id, next) = match self.selected() {
            Some(card) => (card.id.clone(), card.local_status.next()),
            None => return,
        };
        match self.service.update_card_status(&card_id, next, "").await {
            Ok(()) => self.flash(format!("{} → {}", card_id, next.label())),
            Err(e) => self.flash(format!("Status update failed: {e}")),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_cards().len();
        if len == 0 {
            self.selected_card = 0;
        } else if self.selected_card >= len {
            self.selected_card = len - 1;
        }
    }

    fn flash(&mut self, message: String) {
        self.flash_message = Some((message, Instant::now()));
    }
}
