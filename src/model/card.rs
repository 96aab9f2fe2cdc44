use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client-side workflow status layered onto each card. Never supplied by
/// Trello; always joined in from the local status store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardStatus {
    #[default]
    NotStarted,
    InProgress,
    Change,
    Completed,
}

impl CardStatus {
    pub const ALL: [CardStatus; 4] = [
        CardStatus::NotStarted,
        CardStatus::InProgress,
        CardStatus::Change,
        CardStatus::Completed,
    ];

    /// Fixed ordering used by the status sort key.
    pub fn rank(self) -> u8 {
        match self {
            CardStatus::NotStarted => 0,
            CardStatus::InProgress => 1,
            CardStatus::Change => 2,
            CardStatus::Completed => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CardStatus::NotStarted => "Not started",
            CardStatus::InProgress => "In progress",
            CardStatus::Change => "Change requested",
            CardStatus::Completed => "Completed",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            CardStatus::NotStarted => "⚪",
            CardStatus::InProgress => "🔵",
            CardStatus::Change => "🟠",
            CardStatus::Completed => "🟢",
        }
    }

    /// The next status in the cycle, for the single-key status toggle.
    pub fn next(self) -> CardStatus {
        match self {
            CardStatus::NotStarted => CardStatus::InProgress,
            CardStatus::InProgress => CardStatus::Change,
            CardStatus::Change => CardStatus::Completed,
            CardStatus::Completed => CardStatus::NotStarted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub full_name: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible: Option<Member>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub local_status: CardStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardInfo {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One status overlay record, keyed externally by (workspace id, card id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: CardStatus,
    pub last_updated: DateTime<Utc>,
    pub updated_by: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub old_status: CardStatus,
    pub new_status: CardStatus,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
}

/// One complete, internally consistent board capture. Superseded wholesale by
/// the next successful sync, never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub board: BoardInfo,
    pub cards: Vec<Card>,
    pub members: Vec<Member>,
    pub labels: Vec<Label>,
    pub cached_at: DateTime<Utc>,
}

/// First assigned member is the responsible, by convention. Arbitrary but
/// load-bearing; callers go through here so the convention can change in one
/// place.
pub fn pick_responsible(members: &[Member]) -> Option<&Member> {
    members.first()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&CardStatus::NotStarted).unwrap(),
            "\"not-started\""
        );
        assert_eq!(
            serde_json::to_string(&CardStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        let parsed: CardStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, CardStatus::Completed);
    }

    #[test]
    fn status_rank_is_fixed() {
        let ranks: Vec<u8> = CardStatus::ALL.iter().map(|s| s.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3]);
    }

    #[test]
    fn status_cycle_wraps() {
        assert_eq!(CardStatus::Completed.next(), CardStatus::NotStarted);
    }

    #[test]
    fn pick_responsible_is_first_member() {
        let members = vec![
            Member {
                id: "m1".into(),
                full_name: "Ana".into(),
                username: "ana".into(),
                avatar_url: None,
            },
            Member {
                id: "m2".into(),
                full_name: "Bruno".into(),
                username: "bruno".into(),
                avatar_url: None,
            },
        ];
        assert_eq!(pick_responsible(&members).unwrap().id, "m1");
        assert!(pick_responsible(&[]).is_none());
    }
}
