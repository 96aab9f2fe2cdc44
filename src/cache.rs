use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::model::card::BoardSnapshot;

/// Advisory snapshot cache, one JSON file per board under the data
/// directory. Saving always overwrites; this layer never fetches and never
/// decides on its own whether a snapshot should be trusted.
pub struct SnapshotCache {
    dir: PathBuf,
}

impl SnapshotCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self, board_id: &str) -> PathBuf {
        self.dir.join(format!("cache-{board_id}.json"))
    }

    pub fn save(&self, board_id: &str, snapshot: &BoardSnapshot) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let json = serde_json::to_string(snapshot)?;
        let path = self.path(board_id);
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn load(&self, board_id: &str) -> Option<BoardSnapshot> {
        let path = self.path(board_id);
        let contents = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    pub fn is_valid(&self, board_id: &str, ttl: Duration) -> bool {
        self.is_valid_at(board_id, ttl, Utc::now())
    }

    fn is_valid_at(&self, board_id: &str, ttl: Duration, now: DateTime<Utc>) -> bool {
        match self.load(board_id) {
            Some(snapshot) => {
                let age = now.signed_duration_since(snapshot.cached_at);
                age >= chrono::Duration::zero()
                    && age.to_std().map(|a| a < ttl).unwrap_or(false)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::card::BoardInfo;
    use chrono::Duration as ChronoDuration;
    use tempfile::TempDir;

    fn snapshot(cached_at: DateTime<Utc>) -> BoardSnapshot {
        BoardSnapshot {
            board: BoardInfo {
                id: "b1".into(),
                name: "Board".into(),
                url: None,
            },
            cards: vec![],
            members: vec![],
            labels: vec![],
            cached_at,
        }
    }

    #[test]
    fn load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(dir.path().to_path_buf());
        assert!(cache.load("b1").is_none());
        assert!(!cache.is_valid("b1", Duration::from_secs(300)));
    }

    #[test]
    fn valid_right_after_save_invalid_past_ttl() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(dir.path().to_path_buf());
        let saved_at = Utc::now();
        cache.save("b1", &snapshot(saved_at)).unwrap();

        let ttl = Duration::from_secs(5 * 60);
        assert!(cache.is_valid_at("b1", ttl, saved_at + ChronoDuration::seconds(1)));
        // Simulated clock advance past the TTL
        assert!(!cache.is_valid_at("b1", ttl, saved_at + ChronoDuration::minutes(6)));
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(dir.path().to_path_buf());
        let first = Utc::now() - ChronoDuration::hours(1);
        cache.save("b1", &snapshot(first)).unwrap();
        let second = Utc::now();
        cache.save("b1", &snapshot(second)).unwrap();

        assert_eq!(cache.load("b1").unwrap().cached_at, second);
    }

    #[test]
    fn keys_are_per_board() {
        let dir = TempDir::new().unwrap();
        let cache = SnapshotCache::new(dir.path().to_path_buf());
        cache.save("b1", &snapshot(Utc::now())).unwrap();
        assert!(cache.load("b2").is_none());
    }
}
