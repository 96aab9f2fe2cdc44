use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{with_retry, BoardProvider, ProviderResult};
use crate::config::TrelloConfig;
use crate::error::ProviderError;
use crate::model::card::{pick_responsible, BoardInfo, Card, CardStatus, Label, Member};

const BASE_URL: &str = "https://api.trello.com/1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const RATE_LIMIT_REQUESTS: usize = 300;
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(10);

const CARD_FIELDS: &str = "id,name,desc,due,dateLastActivity,url";
const MEMBER_FIELDS: &str = "id,fullName,username,avatarUrl";

/// Rolling-window request budget. Once the window's quota is spent, calls
/// fail fast with `RateLimited` instead of queueing.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    hits: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Mutex::new(VecDeque::new()),
        }
    }

    pub fn try_acquire(&self) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.lock().unwrap();
        while let Some(front) = hits.front() {
            if now.duration_since(*front) >= self.window {
                hits.pop_front();
            } else {
                break;
            }
        }
        if hits.len() >= self.max_requests {
            return false;
        }
        hits.push_back(now);
        true
    }
}

pub struct TrelloProvider {
    credentials: Option<TrelloConfig>,
    client: reqwest::Client,
    limiter: RateLimiter,
}

impl TrelloProvider {
    pub fn new(credentials: Option<TrelloConfig>) -> Self {
        // Empty strings in the config count as absent credentials
        let credentials = credentials
            .filter(|c| !c.api_key.is_empty() && !c.token.is_empty() && !c.board_id.is_empty());
        Self {
            credentials,
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            limiter: RateLimiter::new(RATE_LIMIT_REQUESTS, RATE_LIMIT_WINDOW),
        }
    }

    fn credentials(&self) -> ProviderResult<&TrelloConfig> {
        self.credentials.as_ref().ok_or(ProviderError::NotConfigured)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> ProviderResult<T> {
        let creds = self.credentials()?;
        if !self.limiter.try_acquire() {
            return Err(ProviderError::RateLimited);
        }

        let response = self
            .client
            .get(format!("{BASE_URL}{path}"))
            .query(&[("key", creds.api_key.as_str()), ("token", creds.token.as_str())])
            .query(params)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(status.as_u16()));
        }
        response.json::<T>().await.map_err(map_transport_error)
    }
}

fn map_transport_error(err: reqwest::Error) -> ProviderError {
    ProviderError::Network(err.to_string())
}

fn map_status_error(code: u16) -> ProviderError {
    match code {
        401 => ProviderError::Auth,
        403 => ProviderError::Forbidden,
        404 => ProviderError::NotFound,
        429 => ProviderError::RateLimited,
        500..=599 => ProviderError::Server(code),
        other => ProviderError::Network(format!("unexpected HTTP {other}")),
    }
}

#[derive(Deserialize)]
struct RawBoard {
    id: String,
    name: String,
    url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMember {
    id: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    username: String,
    avatar_url: Option<String>,
}

#[derive(Deserialize)]
struct RawLabel {
    id: String,
    #[serde(default)]
    name: String,
    color: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCard {
    id: String,
    name: String,
    desc: Option<String>,
    due: Option<DateTime<Utc>>,
    date_last_activity: Option<DateTime<Utc>>,
    url: Option<String>,
    #[serde(default)]
    members: Vec<RawMember>,
    #[serde(default)]
    labels: Vec<RawLabel>,
}

fn normalize_member(raw: RawMember) -> Member {
    Member {
        id: raw.id,
        full_name: raw.full_name,
        username: raw.username,
        avatar_url: raw.avatar_url,
    }
}

fn normalize_label(raw: RawLabel) -> Label {
    Label {
        id: raw.id,
        name: raw.name,
        color: raw.color,
    }
}

fn normalize_card(raw: RawCard) -> Card {
    let members: Vec<Member> = raw.members.into_iter().map(normalize_member).collect();
    let responsible = pick_responsible(&members).cloned();
    Card {
        id: raw.id,
        name: raw.name,
        description: raw.desc.filter(|d| !d.trim().is_empty()),
        due: raw.due,
        labels: raw.labels.into_iter().map(normalize_label).collect(),
        members,
        responsible,
        url: raw.url,
        last_activity: raw.date_last_activity,
        // Overlay is applied later by the orchestrator, never here
        local_status: CardStatus::NotStarted,
    }
}

#[async_trait]
impl BoardProvider for TrelloProvider {
    fn name(&self) -> &str {
        "Trello"
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn get_board_info(&self, board_id: &str) -> ProviderResult<BoardInfo> {
        if board_id.is_empty() {
            return Err(ProviderError::NotConfigured);
        }
        let path = format!("/boards/{board_id}");
        let params = [("fields", "id,name,url")];
        let raw: RawBoard = with_retry(|| self.get_json(&path, &params)).await?;
        Ok(BoardInfo {
            id: raw.id,
            name: raw.name,
            url: raw.url,
        })
    }

    async fn get_board_cards(&self, board_id: &str) -> ProviderResult<Vec<Card>> {
        if board_id.is_empty() {
            return Err(ProviderError::NotConfigured);
        }
        let path = format!("/boards/{board_id}/cards");
        let params = [
            ("fields", CARD_FIELDS),
            ("members", "true"),
            ("member_fields", MEMBER_FIELDS),
            ("labels", "true"),
        ];
        let raw: Vec<RawCard> = with_retry(|| self.get_json(&path, &params)).await?;
        Ok(raw.into_iter().map(normalize_card).collect())
    }

    async fn get_board_members(&self, board_id: &str) -> ProviderResult<Vec<Member>> {
        if board_id.is_empty() {
            return Err(ProviderError::NotConfigured);
        }
        let path = format!("/boards/{board_id}/members");
        let params = [("fields", MEMBER_FIELDS)];
        let raw: Vec<RawMember> = with_retry(|| self.get_json(&path, &params)).await?;
        Ok(raw.into_iter().map(normalize_member).collect())
    }

    async fn get_board_labels(&self, board_id: &str) -> ProviderResult<Vec<Label>> {
        if board_id.is_empty() {
            return Err(ProviderError::NotConfigured);
        }
        let path = format!("/boards/{board_id}/labels");
        let raw: Vec<RawLabel> = with_retry(|| self.get_json(&path, &[])).await?;
        Ok(raw.into_iter().map(normalize_label).collect())
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn rate_limiter_exhausts_window() {
        let limiter = RateLimiter::new(3, Duration::from_secs(10));
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn rate_limiter_window_expires() {
        // Zero-length window: every prior hit is already stale
        let limiter = RateLimiter::new(1, Duration::from_secs(0));
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
    }

    #[test]
    fn status_error_mapping() {
        assert_eq!(map_status_error(401), ProviderError::Auth);
        assert_eq!(map_status_error(403), ProviderError::Forbidden);
        assert_eq!(map_status_error(404), ProviderError::NotFound);
        assert_eq!(map_status_error(429), ProviderError::RateLimited);
        assert_eq!(map_status_error(503), ProviderError::Server(503));
    }

    #[test]
    fn unconfigured_provider() {
        let provider = TrelloProvider::new(None);
        assert!(!provider.is_configured());

        let blank = TrelloProvider::new(Some(TrelloConfig {
            api_key: "".into(),
            token: "t".into(),
            board_id: "b".into(),
        }));
        assert!(!blank.is_configured());
    }

    #[test]
    fn normalize_card_applies_conventions() {
        let raw: RawCard = serde_json::from_str(
            r#"{
                "id": "c1",
                "name": "Ship it",
                "desc": "  ",
                "due": "2024-07-11T12:00:00.000Z",
                "dateLastActivity": "2024-07-01T08:30:00.000Z",
                "url": "https://trello.com/c/c1",
                "members": [
                    {"id": "m1", "fullName": "Ana Lima", "username": "ana"},
                    {"id": "m2", "fullName": "Bruno", "username": "bruno"}
                ],
                "labels": [{"id": "l1", "name": "urgent", "color": "red"}]
            }"#,
        )
        .unwrap();

        let card = normalize_card(raw);
        assert_eq!(card.responsible.as_ref().unwrap().id, "m1");
        assert_eq!(card.local_status, CardStatus::NotStarted);
        // Whitespace-only descriptions are dropped
        assert!(card.description.is_none());
        assert_eq!(card.labels[0].name, "urgent");
        assert!(card.due.is_some());
    }

    #[test]
    fn normalize_card_without_members() {
        let raw: RawCard = serde_json::from_str(
            r#"{"id": "c2", "name": "Loose end"}"#,
        )
        .unwrap();
        let card = normalize_card(raw);
        assert!(card.responsible.is_none());
        assert!(card.members.is_empty());
        assert!(card.due.is_none());
    }
}
