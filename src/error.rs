use thiserror::Error;

/// Failures surfaced by the board data provider. Retry policy lives with the
/// provider; by the time one of these reaches the orchestrator it is final.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Trello credentials not configured")]
    NotConfigured,
    #[error("Trello authentication failed (check api_key/token)")]
    Auth,
    #[error("Trello rate limit exceeded")]
    RateLimited,
    #[error("network error: {0}")]
    Network(String),
    #[error("board or resource not found")]
    NotFound,
    #[error("access to board forbidden")]
    Forbidden,
    #[error("Trello server error (HTTP {0})")]
    Server(u16),
}

impl ProviderError {
    /// Server errors, rate limits and network failures are worth another
    /// attempt; auth/not-found/forbidden never change on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::Server(_) | ProviderError::RateLimited | ProviderError::Network(_)
        )
    }
}

/// Failures surfaced by the sync orchestrator and status mutation paths.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no workspace bound")]
    NoWorkspace,
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("status store: {0}")]
    Store(#[source] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(ProviderError::Server(502).is_retryable());
        assert!(ProviderError::RateLimited.is_retryable());
        assert!(ProviderError::Network("timeout".into()).is_retryable());
        assert!(!ProviderError::Auth.is_retryable());
        assert!(!ProviderError::NotFound.is_retryable());
        assert!(!ProviderError::Forbidden.is_retryable());
        assert!(!ProviderError::NotConfigured.is_retryable());
    }
}
