use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub trello: Option<TrelloConfig>,
    pub remote_store: Option<RemoteStoreConfig>,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub user: UserConfig,
}

#[derive(Debug, Deserialize)]
pub struct TrelloConfig {
    pub api_key: String,
    pub token: String,
    pub board_id: String,
}

/// Remote document store holding status overlays shared across devices.
#[derive(Debug, Deserialize)]
pub struct RemoteStoreConfig {
    pub base_url: String,
    pub auth_token: String,
}

#[derive(Debug, Deserialize)]
pub struct SyncConfig {
    /// Auto-sync interval in minutes.
    pub interval_minutes: u64,
    /// Board snapshot cache TTL in minutes.
    pub cache_ttl_minutes: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            interval_minutes: 5,
            cache_ttl_minutes: 5,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserConfig {
    /// Recorded as the editor on status changes.
    // TODO: replace with a real identity once the remote store grows auth
    pub id: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            id: "local-user".into(),
        }
    }
}

fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".boardmirror")
        .join("config.toml")
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".boardmirror")
}

pub fn load_config() -> Result<AppConfig> {
    let path = config_path();
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config.toml")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config: AppConfig = toml::from_str(
            r#"
            [trello]
            api_key = "k"
            token = "t"
            board_id = "b1"

            [remote_store]
            base_url = "https://store.example.com"
            auth_token = "secret"

            [sync]
            interval_minutes = 10
            cache_ttl_minutes = 2

            [user]
            id = "maria"
            "#,
        )
        .unwrap();

        let trello = config.trello.unwrap();
        assert_eq!(trello.board_id, "b1");
        assert_eq!(config.sync.interval_minutes, 10);
        assert_eq!(config.sync.cache_ttl_minutes, 2);
        assert_eq!(config.user.id, "maria");
        assert!(config.remote_store.is_some());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.trello.is_none());
        assert!(config.remote_store.is_none());
        assert_eq!(config.sync.interval_minutes, 5);
        assert_eq!(config.user.id, "local-user");
    }
}
