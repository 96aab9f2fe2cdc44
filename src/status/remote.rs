use std::collections::HashMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;

use super::StatusBackend;
use crate::config::RemoteStoreConfig;
use crate::model::card::{StatusEntry, StatusHistoryEntry};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote document-store backend over a plain JSON HTTP API:
/// `{base}/workspaces/{ws}/cards` holds the status map, each card document
/// at `.../cards/{id}` with its history at `.../cards/{id}/history`.
pub struct RemoteBackend {
    base_url: String,
    auth_token: String,
    client: reqwest::Client,
}

impl RemoteBackend {
    pub fn new(config: &RemoteStoreConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    fn card_url(&self, workspace_id: &str, card_id: &str) -> String {
        format!(
            "{}/workspaces/{workspace_id}/cards/{card_id}",
            self.base_url
        )
    }
}

#[async_trait]
impl StatusBackend for RemoteBackend {
    fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.auth_token.is_empty()
    }

    async fn load_statuses(&self, workspace_id: &str) -> Result<HashMap<String, StatusEntry>> {
        let url = format!("{}/workspaces/{workspace_id}/cards", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.auth_token)
            .send()
            .await
            .context("remote store unreachable")?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            // Workspace not created yet on the remote side
            return Ok(HashMap::new());
        }
        if !response.status().is_success() {
            bail!("remote store returned HTTP {}", response.status());
        }
        response.json().await.context("invalid status document")
    }

    async fn save_status(
        &self,
        workspace_id: &str,
        card_id: &str,
        entry: &StatusEntry,
    ) -> Result<()> {
        let response = self
            .client
            .put(self.card_url(workspace_id, card_id))
            .bearer_auth(&self.auth_token)
            .json(entry)
            .send()
            .await
            .context("remote store unreachable")?;
        if !response.status().is_success() {
            bail!("remote store returned HTTP {}", response.status());
        }
        Ok(())
    }

    async fn load_history(
        &self,
        workspace_id: &str,
        card_id: &str,
    ) -> Result<Vec<StatusHistoryEntry>> {
        let url = format!("{}/history", self.card_url(workspace_id, card_id));
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.auth_token)
            .send()
            .await
            .context("remote store unreachable")?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            bail!("remote store returned HTTP {}", response.status());
        }
        response.json().await.context("invalid history document")
    }

    async fn save_history(
        &self,
        workspace_id: &str,
        card_id: &str,
        history: &[StatusHistoryEntry],
    ) -> Result<()> {
        let url = format!("{}/history", self.card_url(workspace_id, card_id));
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.auth_token)
            .json(&history)
            .send()
            .await
            .context("remote store unreachable")?;
        if !response.status().is_success() {
            bail!("remote store returned HTTP {}", response.status());
        }
        Ok(())
    }

    async fn remove_card(&self, workspace_id: &str, card_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.card_url(workspace_id, card_id))
            .bearer_auth(&self.auth_token)
            .send()
            .await
            .context("remote store unreachable")?;
        // Deleting an absent document is not an error
        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            bail!("remote store returned HTTP {}", response.status());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_probe() {
        let backend = RemoteBackend::new(&RemoteStoreConfig {
            base_url: "https://store.example.com/".into(),
            auth_token: "secret".into(),
        });
        assert!(backend.is_configured());
        // Trailing slash is normalized away
        assert_eq!(
            backend.card_url("ws1", "c1"),
            "https://store.example.com/workspaces/ws1/cards/c1"
        );

        let blank = RemoteBackend::new(&RemoteStoreConfig {
            base_url: String::new(),
            auth_token: "secret".into(),
        });
        assert!(!blank.is_configured());
    }
}
