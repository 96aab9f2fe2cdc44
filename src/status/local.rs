use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::StatusBackend;
use crate::model::card::{StatusEntry, StatusHistoryEntry};

/// On-device backend: one statuses file and one history file per workspace
/// under the data directory.
pub struct FileBackend {
    dir: PathBuf,
}

type StatusMap = HashMap<String, StatusEntry>;
type HistoryMap = HashMap<String, Vec<StatusHistoryEntry>>;

impl FileBackend {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn statuses_path(&self, workspace_id: &str) -> PathBuf {
        self.dir.join(format!("statuses-{workspace_id}.json"))
    }

    fn history_path(&self, workspace_id: &str) -> PathBuf {
        self.dir.join(format!("history-{workspace_id}.json"))
    }

    fn read_json<T: Default + serde::de::DeserializeOwned>(&self, path: &PathBuf) -> T {
        if !path.exists() {
            return T::default();
        }
        std::fs::read_to_string(path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    fn write_json<T: serde::Serialize>(&self, path: &PathBuf, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let json = serde_json::to_string_pretty(value)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[async_trait]
impl StatusBackend for FileBackend {
    fn is_configured(&self) -> bool {
        true
    }

    async fn load_statuses(&self, workspace_id: &str) -> Result<StatusMap> {
        Ok(self.read_json(&self.statuses_path(workspace_id)))
    }

    async fn save_status(
        &self,
        workspace_id: &str,
        card_id: &str,
        entry: &StatusEntry,
    ) -> Result<()> {
        let path = self.statuses_path(workspace_id);
        let mut statuses: StatusMap = self.read_json(&path);
        statuses.insert(card_id.to_string(), entry.clone());
        self.write_json(&path, &statuses)
    }

    async fn load_history(
        &self,
        workspace_id: &str,
        card_id: &str,
    ) -> Result<Vec<StatusHistoryEntry>> {
        let histories: HistoryMap = self.read_json(&self.history_path(workspace_id));
        Ok(histories.get(card_id).cloned().unwrap_or_default())
    }

    async fn save_history(
        &self,
        workspace_id: &str,
        card_id: &str,
        history: &[StatusHistoryEntry],
    ) -> Result<()> {
        let path = self.history_path(workspace_id);
        let mut histories: HistoryMap = self.read_json(&path);
        histories.insert(card_id.to_string(), history.to_vec());
        self.write_json(&path, &histories)
    }

    async fn remove_card(&self, workspace_id: &str, card_id: &str) -> Result<()> {
        let statuses_path = self.statuses_path(workspace_id);
        let mut statuses: StatusMap = self.read_json(&statuses_path);
        if statuses.remove(card_id).is_some() {
            self.write_json(&statuses_path, &statuses)?;
        }

        let history_path = self.history_path(workspace_id);
        let mut histories: HistoryMap = self.read_json(&history_path);
        if histories.remove(card_id).is_some() {
            self.write_json(&history_path, &histories)?;
        }
        Ok(())
    }
}
