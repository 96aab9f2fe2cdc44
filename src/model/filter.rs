use std::collections::HashSet;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc, Weekday};

use crate::model::card::{Card, CardStatus};

/// Named due-date window predicates. A closed set: unrecognized keys are a
/// parse error at the boundary rather than a silently disabled filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DueBucket {
    NoDueDate,
    Overdue,
    Today,
    ThisWeek,
}

impl DueBucket {
    pub const ALL: [DueBucket; 4] = [
        DueBucket::NoDueDate,
        DueBucket::Overdue,
        DueBucket::Today,
        DueBucket::ThisWeek,
    ];

    pub fn key(self) -> &'static str {
        match self {
            DueBucket::NoDueDate => "no-due-date",
            DueBucket::Overdue => "overdue",
            DueBucket::Today => "today",
            DueBucket::ThisWeek => "this-week",
        }
    }

    pub fn parse(key: &str) -> Result<DueBucket> {
        match key {
            "no-due-date" => Ok(DueBucket::NoDueDate),
            "overdue" => Ok(DueBucket::Overdue),
            "today" => Ok(DueBucket::Today),
            "this-week" => Ok(DueBucket::ThisWeek),
            other => bail!("unrecognized due-date bucket: {other}"),
        }
    }

    pub fn matches(self, due: Option<&DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let due = match due {
            None => return self == DueBucket::NoDueDate,
            Some(d) => *d,
        };
        match self {
            DueBucket::NoDueDate => false,
            DueBucket::Overdue => due < now && due.date_naive() != now.date_naive(),
            DueBucket::Today => due.date_naive() == now.date_naive(),
            DueBucket::ThisWeek => {
                // Monday-Sunday window containing now
                let week = now.date_naive().week(Weekday::Mon);
                let day = due.date_naive();
                day >= week.first_day() && day <= week.last_day()
            }
        }
    }
}

/// Active filter selections. Fields AND-combine; values within a field
/// OR-combine.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub search: String,
    pub statuses: HashSet<CardStatus>,
    pub labels: HashSet<String>,
    pub due: HashSet<DueBucket>,
    pub members: HashSet<String>,
}

impl FilterState {
    pub fn toggle_status(&mut self, status: CardStatus) {
        if !self.statuses.remove(&status) {
            self.statuses.insert(status);
        }
    }

    pub fn toggle_label(&mut self, name: &str) {
        if !self.labels.remove(name) {
            self.labels.insert(name.to_string());
        }
    }

    pub fn toggle_due(&mut self, bucket: DueBucket) {
        if !self.due.remove(&bucket) {
            self.due.insert(bucket);
        }
    }

    pub fn toggle_member(&mut self, member_id: &str) {
        if !self.members.remove(member_id) {
            self.members.insert(member_id.to_string());
        }
    }

    pub fn clear(&mut self) {
        *self = FilterState::default();
    }

    pub fn active_count(&self) -> usize {
        let search = usize::from(!self.search.is_empty());
        search + self.statuses.len() + self.labels.len() + self.due.len() + self.members.len()
    }

    pub fn is_active(&self) -> bool {
        self.active_count() > 0
    }

    fn matches(&self, card: &Card, now: DateTime<Utc>) -> bool {
        if !self.search.is_empty() {
            let term = self.search.to_lowercase();
            let in_name = card.name.to_lowercase().contains(&term);
            let in_desc = card
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&term))
                .unwrap_or(false);
            if !in_name && !in_desc {
                return false;
            }
        }

        if !self.statuses.is_empty() && !self.statuses.contains(&card.local_status) {
            return false;
        }

        if !self.labels.is_empty()
            && !card.labels.iter().any(|l| self.labels.contains(&l.name))
        {
            return false;
        }

        if !self.members.is_empty() {
            let responsible_matches = card
                .responsible
                .as_ref()
                .map(|m| self.members.contains(&m.id))
                .unwrap_or(false);
            if !responsible_matches {
                return false;
            }
        }

        if !self.due.is_empty()
            && !self
                .due
                .iter()
                .any(|b| b.matches(card.due.as_ref(), now))
        {
            return false;
        }

        true
    }
}

/// Applies the filter state to a card list. Pure; never mutates the input.
pub fn filter_cards<'a>(cards: &'a [Card], filters: &FilterState, now: DateTime<Utc>) -> Vec<&'a Card> {
    cards.iter().filter(|c| filters.matches(c, now)).collect()
}
