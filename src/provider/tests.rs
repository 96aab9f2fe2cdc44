use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::{with_retry, BoardProvider, ProviderResult};
use crate::error::ProviderError;
use crate::model::card::{BoardInfo, Card, CardStatus, Label, Member};

/// A mock provider that counts calls and fails a configurable number of
/// times before succeeding.
pub struct MockBoardProvider {
    pub calls: Arc<AtomicU32>,
    fail_first: u32,
    failure: ProviderError,
    cards: Vec<Card>,
}

impl MockBoardProvider {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            calls: Arc::new(AtomicU32::new(0)),
            fail_first: 0,
            failure: ProviderError::Server(500),
            cards,
        }
    }

    pub fn failing_with(mut self, failure: ProviderError, times: u32) -> Self {
        self.failure = failure;
        self.fail_first = times;
        self
    }

    fn tick(&self) -> ProviderResult<()> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_first {
            Err(self.failure.clone())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BoardProvider for MockBoardProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn get_board_info(&self, board_id: &str) -> ProviderResult<BoardInfo> {
        self.tick()?;
        Ok(BoardInfo {
            id: board_id.to_string(),
            name: "Mock Board".into(),
            url: None,
        })
    }

    async fn get_board_cards(&self, _board_id: &str) -> ProviderResult<Vec<Card>> {
        self.tick()?;
        Ok(self.cards.clone())
    }

    async fn get_board_members(&self, _board_id: &str) -> ProviderResult<Vec<Member>> {
        self.tick()?;
        Ok(vec![])
    }

    async fn get_board_labels(&self, _board_id: &str) -> ProviderResult<Vec<Label>> {
        self.tick()?;
        Ok(vec![])
    }
}

pub fn make_card(id: &str) -> Card {
    Card {
        id: id.to_string(),
        name: format!("Card {id}"),
        description: None,
        due: None,
        labels: vec![],
        members: vec![],
        responsible: None,
        url: None,
        last_activity: None,
        local_status: CardStatus::NotStarted,
    }
}

#[tokio::test(start_paused = true)]
async fn retry_succeeds_on_third_attempt() {
    let attempts = AtomicU32::new(0);
    let result = with_retry(|| {
        let n = attempts.fetch_add(1, Ordering::SeqCst);
        async move {
            if n < 2 {
                Err(ProviderError::Server(502))
            } else {
                Ok("data")
            }
        }
    })
    .await;
    assert_eq!(result.unwrap(), "data");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn retry_gives_up_after_three_attempts() {
    let attempts = AtomicU32::new(0);
    let result: ProviderResult<()> = with_retry(|| {
        attempts.fetch_add(1, Ordering::SeqCst);
        async { Err(ProviderError::RateLimited) }
    })
    .await;
    assert_eq!(result.unwrap_err(), ProviderError::RateLimited);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retry_never_repeats_terminal_errors() {
    for terminal in [
        ProviderError::Auth,
        ProviderError::NotFound,
        ProviderError::Forbidden,
    ] {
        let attempts = AtomicU32::new(0);
        let failure = terminal.clone();
        let result: ProviderResult<()> = with_retry(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            let failure = failure.clone();
            async move { Err(failure) }
        })
        .await;
        assert_eq!(result.unwrap_err(), terminal);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test]
async fn mock_provider_recovers_after_failures() {
    let provider = MockBoardProvider::new(vec![make_card("a")])
        .failing_with(ProviderError::Server(500), 1);
    assert!(provider.get_board_cards("b1").await.is_err());
    let cards = provider.get_board_cards("b1").await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}
