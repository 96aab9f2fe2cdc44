pub mod trello;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::model::card::{BoardInfo, Card, Label, Member};

#[cfg(test)]
pub mod tests;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Read-only window onto a remote board. Implementations must never issue a
/// write to the remote source; the local status overlay is the only thing
/// this system mutates.
#[async_trait]
pub trait BoardProvider: Send + Sync {
    fn name(&self) -> &str;
    /// Cheap credential probe; lets the orchestrator fail fast before
    /// issuing any request.
    fn is_configured(&self) -> bool {
        true
    }
    async fn get_board_info(&self, board_id: &str) -> ProviderResult<BoardInfo>;
    async fn get_board_cards(&self, board_id: &str) -> ProviderResult<Vec<Card>>;
    async fn get_board_members(&self, board_id: &str) -> ProviderResult<Vec<Member>>;
    async fn get_board_labels(&self, board_id: &str) -> ProviderResult<Vec<Label>>;
}

pub const RETRY_ATTEMPTS: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Runs `op` up to [`RETRY_ATTEMPTS`] times with a fixed delay between
/// attempts. Only retryable errors (5xx, 429, network) get another attempt;
/// terminal errors surface immediately.
pub async fn with_retry<T, F, Fut>(mut op: F) -> ProviderResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProviderResult<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < RETRY_ATTEMPTS => {
                tokio::time::sleep(RETRY_DELAY).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
