pub mod local;
pub mod remote;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use crate::model::card::{CardStatus, StatusEntry, StatusHistoryEntry};

pub const HISTORY_CAP: usize = 50;

/// Durable storage for status overlays. Two implementations: the remote
/// document store (shared across devices) and the on-device JSON files.
#[async_trait]
pub trait StatusBackend: Send + Sync {
    fn is_configured(&self) -> bool;
    async fn load_statuses(&self, workspace_id: &str) -> Result<HashMap<String, StatusEntry>>;
    async fn save_status(&self, workspace_id: &str, card_id: &str, entry: &StatusEntry)
        -> Result<()>;
    async fn load_history(&self, workspace_id: &str, card_id: &str)
        -> Result<Vec<StatusHistoryEntry>>;
    async fn save_history(
        &self,
        workspace_id: &str,
        card_id: &str,
        history: &[StatusHistoryEntry],
    ) -> Result<()>;
    async fn remove_card(&self, workspace_id: &str, card_id: &str) -> Result<()>;
}

/// Per-workspace status overlay persistence. Prefers the remote backend when
/// its configuration probe reports ready; the choice is re-evaluated on every
/// call, with no sticky fallback state. Reads degrade to on-device data on
/// remote failure; writes go to exactly one backend and their failures
/// propagate.
pub struct StatusStore {
    remote: Option<Box<dyn StatusBackend>>,
    local: Box<dyn StatusBackend>,
}

impl StatusStore {
    pub fn new(remote: Option<Box<dyn StatusBackend>>, local: Box<dyn StatusBackend>) -> Self {
        Self { remote, local }
    }

    fn write_backend(&self) -> &dyn StatusBackend {
        match &self.remote {
            Some(remote) if remote.is_configured() => remote.as_ref(),
            _ => self.local.as_ref(),
        }
    }

    /// Full overlay for a workspace. Never fails; an unreachable remote
    /// degrades to whatever the on-device backend has.
    pub async fn get_all(&self, workspace_id: &str) -> HashMap<String, StatusEntry> {
        if let Some(remote) = &self.remote {
            if remote.is_configured() {
                if let Ok(statuses) = remote.load_statuses(workspace_id).await {
                    return statuses;
                }
            }
        }
        self.local
            .load_statuses(workspace_id)
            .await
            .unwrap_or_default()
    }

    /// Upserts the status entry and records the transition in the card's
    /// history, trimmed to the most recent [`HISTORY_CAP`] entries.
    pub async fn set_status(
        &self,
        workspace_id: &str,
        card_id: &str,
        new_status: CardStatus,
        editor_id: &str,
        note: &str,
    ) -> Result<()> {
        let backend = self.write_backend();

        let old_status = backend
            .load_statuses(workspace_id)
            .await
            .unwrap_or_default()
            .get(card_id)
            .map(|e| e.status)
            .unwrap_or_default();

        let now = Utc::now();
        let entry = StatusEntry {
            status: new_status,
            last_updated: now,
            updated_by: editor_id.to_string(),
            note: note.to_string(),
        };
        backend.save_status(workspace_id, card_id, &entry).await?;

        let mut history = backend
            .load_history(workspace_id, card_id)
            .await
            .unwrap_or_default();
        history.insert(
            0,
            StatusHistoryEntry {
                old_status,
                new_status,
                changed_by: editor_id.to_string(),
                changed_at: now,
            },
        );
        history.truncate(HISTORY_CAP);
        backend.save_history(workspace_id, card_id, &history).await
    }

    /// Change history for one card, newest first. Degrades like `get_all`.
    pub async fn get_history(
        &self,
        workspace_id: &str,
        card_id: &str,
    ) -> Vec<StatusHistoryEntry> {
        if let Some(remote) = &self.remote {
            if remote.is_configured() {
                if let Ok(history) = remote.load_history(workspace_id, card_id).await {
                    return history;
                }
            }
        }
        self.local
            .load_history(workspace_id, card_id)
            .await
            .unwrap_or_default()
    }

    /// Deletes a card's entry and history. Reconciliation capability for
    /// cards removed upstream; never triggered automatically.
    pub async fn remove_card(&self, workspace_id: &str, card_id: &str) -> Result<()> {
        self.write_backend().remove_card(workspace_id, card_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::local::FileBackend;
    use super::*;
    use anyhow::bail;
    use tempfile::TempDir;

    fn file_store(dir: &TempDir) -> StatusStore {
        StatusStore::new(None, Box::new(FileBackend::new(dir.path().to_path_buf())))
    }

    /// Configured backend whose every call fails, standing in for an
    /// unreachable remote store.
    struct UnreachableBackend;

    #[async_trait]
    impl StatusBackend for UnreachableBackend {
        fn is_configured(&self) -> bool {
            true
        }
        async fn load_statuses(&self, _ws: &str) -> Result<HashMap<String, StatusEntry>> {
            bail!("connection refused")
        }
        async fn save_status(&self, _ws: &str, _card: &str, _e: &StatusEntry) -> Result<()> {
            bail!("connection refused")
        }
        async fn load_history(&self, _ws: &str, _card: &str) -> Result<Vec<StatusHistoryEntry>> {
            bail!("connection refused")
        }
        async fn save_history(
            &self,
            _ws: &str,
            _card: &str,
            _h: &[StatusHistoryEntry],
        ) -> Result<()> {
            bail!("connection refused")
        }
        async fn remove_card(&self, _ws: &str, _card: &str) -> Result<()> {
            bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn get_all_empty_when_nothing_persisted() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        assert!(store.get_all("ws1").await.is_empty());
    }

    #[tokio::test]
    async fn set_status_upserts_and_records_transition() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);

        store
            .set_status("ws1", "c1", CardStatus::InProgress, "ana", "kick-off")
            .await
            .unwrap();

        let all = store.get_all("ws1").await;
        let entry = &all["c1"];
        assert_eq!(entry.status, CardStatus::InProgress);
        assert_eq!(entry.updated_by, "ana");
        assert_eq!(entry.note, "kick-off");

        // First transition comes from the not-started default
        let history = store.get_history("ws1", "c1").await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].old_status, CardStatus::NotStarted);
        assert_eq!(history[0].new_status, CardStatus::InProgress);

        store
            .set_status("ws1", "c1", CardStatus::Completed, "ana", "")
            .await
            .unwrap();
        let history = store.get_history("ws1", "c1").await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].old_status, CardStatus::InProgress);
        assert_eq!(history[0].new_status, CardStatus::Completed);
    }

    #[tokio::test]
    async fn history_caps_at_fifty_newest_first() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);

        for i in 0..51 {
            let status = CardStatus::ALL[i % 4];
            store
                .set_status("ws1", "c1", status, "ana", "")
                .await
                .unwrap();
        }

        let history = store.get_history("ws1", "c1").await;
        assert_eq!(history.len(), HISTORY_CAP);
        // Index 0 is the 51st write; the very first transition fell off
        assert_eq!(history[0].new_status, CardStatus::ALL[50 % 4]);
        assert_eq!(history[0].old_status, CardStatus::ALL[49 % 4]);
        assert_eq!(history[49].new_status, CardStatus::ALL[1]);
    }

    #[tokio::test]
    async fn remove_card_drops_entry_and_history() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);

        store
            .set_status("ws1", "c1", CardStatus::Change, "ana", "")
            .await
            .unwrap();
        store.remove_card("ws1", "c1").await.unwrap();

        assert!(store.get_all("ws1").await.is_empty());
        assert!(store.get_history("ws1", "c1").await.is_empty());
    }

    #[tokio::test]
    async fn statuses_are_independent_per_workspace() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);

        store
            .set_status("ws1", "c1", CardStatus::Completed, "ana", "")
            .await
            .unwrap();
        assert!(store.get_all("ws2").await.is_empty());
        assert_eq!(store.get_all("ws1").await.len(), 1);
    }

    #[tokio::test]
    async fn reads_fall_back_to_local_when_remote_fails() {
        let dir = TempDir::new().unwrap();
        let local = FileBackend::new(dir.path().to_path_buf());

        // Seed local data directly, then front it with a dead remote
        let seeded = StatusStore::new(None, Box::new(FileBackend::new(dir.path().to_path_buf())));
        seeded
            .set_status("ws1", "c1", CardStatus::InProgress, "ana", "")
            .await
            .unwrap();

        let store = StatusStore::new(Some(Box::new(UnreachableBackend)), Box::new(local));
        let all = store.get_all("ws1").await;
        assert_eq!(all["c1"].status, CardStatus::InProgress);
        assert_eq!(store.get_history("ws1", "c1").await.len(), 1);
    }

    #[tokio::test]
    async fn write_failures_propagate() {
        let dir = TempDir::new().unwrap();
        let store = StatusStore::new(
            Some(Box::new(UnreachableBackend)),
            Box::new(FileBackend::new(dir.path().to_path_buf())),
        );

        // Writes target the configured remote and must not silently land on
        // the local backend instead
        let result = store
            .set_status("ws1", "c1", CardStatus::Completed, "ana", "")
            .await;
        assert!(result.is_err());

        let fallback_only = file_store(&dir);
        assert!(fallback_only.get_all("ws1").await.is_empty());
    }
}
