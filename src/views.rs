//! Derived views over the merged card list: sorting, grouping, stats and
//! due-date alerts. All pure functions; the orchestrator's list is never
//! mutated here.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::model::card::{Card, CardStatus};
use crate::model::filter::DueBucket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    DueDate,
    Status,
    Priority,
    Name,
    Responsible,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::DueDate => "due",
            SortKey::Status => "status",
            SortKey::Priority => "priority",
            SortKey::Name => "name",
            SortKey::Responsible => "responsible",
        }
    }

    pub fn next(self) -> SortKey {
        match self {
            SortKey::DueDate => SortKey::Status,
            SortKey::Status => SortKey::Priority,
            SortKey::Priority => SortKey::Name,
            SortKey::Name => SortKey::Responsible,
            SortKey::Responsible => SortKey::DueDate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> SortOrder {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Priority rank 0..=3 derived from label names; language variants of the
/// original board conventions are accepted.
pub fn priority_rank(card: &Card) -> u8 {
    card.labels
        .iter()
        .map(|label| match label.name.to_lowercase().as_str() {
            "urgent" | "urgente" => 3,
            "high" | "alta" => 2,
            "medium" | "média" | "media" => 1,
            _ => 0,
        })
        .max()
        .unwrap_or(0)
}

fn due_date_cmp(a: &Card, b: &Card, now: DateTime<Utc>) -> Ordering {
    // Undated cards sort last, overdue cards first, then ascending by due
    match (a.due, b.due) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(da), Some(db)) => {
            let a_overdue = DueBucket::Overdue.matches(Some(&da), now);
            let b_overdue = DueBucket::Overdue.matches(Some(&db), now);
            match (a_overdue, b_overdue) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => da.cmp(&db),
            }
        }
    }
}

/// Sorts a (typically already filtered) card list. The due-date key has one
/// canonical order regardless of direction; every other key honors asc/desc.
pub fn sort_cards<'a>(
    mut cards: Vec<&'a Card>,
    key: SortKey,
    order: SortOrder,
    now: DateTime<Utc>,
) -> Vec<&'a Card> {
    match key {
        SortKey::DueDate => cards.sort_by(|a, b| due_date_cmp(a, b, now)),
        SortKey::Status => {
            cards.sort_by_key(|c| c.local_status.rank());
            if order == SortOrder::Desc {
                cards.reverse();
            }
        }
        SortKey::Priority => {
            cards.sort_by_key(|c| priority_rank(c));
            if order == SortOrder::Desc {
                cards.reverse();
            }
        }
        SortKey::Name => {
            cards.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            if order == SortOrder::Desc {
                cards.reverse();
            }
        }
        SortKey::Responsible => {
            cards.sort_by(|a, b| {
                let name = |c: &Card| {
                    c.responsible
                        .as_ref()
                        .map(|m| m.full_name.to_lowercase())
                        .unwrap_or_default()
                };
                name(a).cmp(&name(b))
            });
            if order == SortOrder::Desc {
                cards.reverse();
            }
        }
    }
    cards
}

pub const UNASSIGNED: &str = "unassigned";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsibleGroup {
    pub id: String,
    pub name: String,
    pub count: usize,
}

/// Partitions cards by responsible member, with a sentinel group for cards
/// that have none.
pub fn group_by_responsible(cards: &[&Card]) -> HashMap<String, ResponsibleGroup> {
    let mut groups: HashMap<String, ResponsibleGroup> = HashMap::new();
    for card in cards {
        let (id, name) = match &card.responsible {
            Some(member) => (member.id.clone(), member.full_name.clone()),
            None => (UNASSIGNED.to_string(), "Unassigned".to_string()),
        };
        groups
            .entry(id.clone())
            .or_insert(ResponsibleGroup { id, name, count: 0 })
            .count += 1;
    }
    groups
}

pub fn group_by_status(cards: &[&Card]) -> HashMap<CardStatus, usize> {
    let mut groups = HashMap::new();
    for card in cards {
        *groups.entry(card.local_status).or_insert(0) += 1;
    }
    groups
}

#[derive(Debug, Clone, Default)]
pub struct CardStats {
    pub total: usize,
    pub by_status: HashMap<CardStatus, usize>,
    pub by_responsible: HashMap<String, ResponsibleGroup>,
    pub overdue: usize,
    pub today: usize,
    pub this_week: usize,
}

pub fn card_stats(cards: &[&Card], now: DateTime<Utc>) -> CardStats {
    let count_bucket = |bucket: DueBucket| {
        cards
            .iter()
            .filter(|c| bucket.matches(c.due.as_ref(), now))
            .count()
    };
    CardStats {
        total: cards.len(),
        by_status: group_by_status(cards),
        by_responsible: group_by_responsible(cards),
        overdue: count_bucket(DueBucket::Overdue),
        today: count_bucket(DueBucket::Today),
        this_week: count_bucket(DueBucket::ThisWeek),
    }
}

/// Urgency classification for a card's due date, shown next to each card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueAlert {
    Overdue,
    Today,
    Tomorrow,
    Upcoming,
    Normal,
}

pub fn due_alert(due: Option<&DateTime<Utc>>, now: DateTime<Utc>) -> DueAlert {
    let due = match due {
        None => return DueAlert::Normal,
        Some(d) => *d,
    };
    if DueBucket::Overdue.matches(Some(&due), now) {
        return DueAlert::Overdue;
    }
    if due.date_naive() == now.date_naive() {
        return DueAlert::Today;
    }
    if due.date_naive() == (now + Duration::days(1)).date_naive() {
        return DueAlert::Tomorrow;
    }
    if due > now && due <= now + Duration::days(3) {
        return DueAlert::Upcoming;
    }
    DueAlert::Normal
}

impl DueAlert {
    pub fn tag(self, due: DateTime<Utc>, now: DateTime<Utc>) -> String {
        match self {
            DueAlert::Overdue => {
                let days = (now.date_naive() - due.date_naive()).num_days();
                format!("OVERDUE {days}d")
            }
            DueAlert::Today => "TODAY".into(),
            DueAlert::Tomorrow => "TOMORROW".into(),
            DueAlert::Upcoming => {
                let days = (due.date_naive() - now.date_naive()).num_days();
                format!("{days}d")
            }
            DueAlert::Normal => String::new(),
        }
    }
}
