use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::app::Action;
use crate::cache::SnapshotCache;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::model::card::{
    BoardInfo, BoardSnapshot, Card, CardStatus, Label, Member, StatusEntry, StatusHistoryEntry,
};
use crate::provider::BoardProvider;
use crate::status::StatusStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncState {
    Idle,
    Syncing,
}

/// How a `sync` call resolved. `AlreadySyncing` is a soft signal, not an
/// error: a sync was in flight and the call was a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced,
    FromCache,
    AlreadySyncing,
}

/// Owns the authoritative merged card/member/label lists and drives the
/// sync cycle: fetch remote state, join the local status overlay, republish
/// the snapshot. One workspace at a time.
pub struct SyncService {
    provider: Box<dyn BoardProvider>,
    status_store: StatusStore,
    cache: SnapshotCache,
    workspace: Option<String>,
    editor_id: String,
    cache_ttl: Duration,
    sync_interval: Duration,

    pub cards: Vec<Card>,
    pub members: Vec<Member>,
    pub labels: Vec<Label>,
    pub board: Option<BoardInfo>,
    pub last_sync: Option<DateTime<Utc>>,
    pub error: Option<String>,
    state: SyncState,
    timer: Option<JoinHandle<()>>,
}

impl SyncService {
    pub fn new(
        provider: Box<dyn BoardProvider>,
        status_store: StatusStore,
        cache: SnapshotCache,
        workspace: Option<String>,
        editor_id: String,
        sync_config: &SyncConfig,
    ) -> Self {
        Self {
            provider,
            status_store,
            cache,
            workspace,
            editor_id,
            cache_ttl: Duration::from_secs(sync_config.cache_ttl_minutes * 60),
            sync_interval: Duration::from_secs(sync_config.interval_minutes * 60),
            cards: Vec::new(),
            members: Vec::new(),
            labels: Vec::new(),
            board: None,
            last_sync: None,
            error: None,
            state: SyncState::Idle,
            timer: None,
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.state == SyncState::Syncing
    }

    pub fn workspace(&self) -> Option<&str> {
        self.workspace.as_deref()
    }

    /// One sync cycle. Unforced calls trust a valid cache and return
    /// immediately when a sync is already in flight.
    pub async fn sync(&mut self, board_id: &str, force: bool) -> Result<SyncOutcome, SyncError> {
        if self.state == SyncState::Syncing && !force {
            return Ok(SyncOutcome::AlreadySyncing);
        }
        self.state = SyncState::Syncing;
        let outcome = self.sync_inner(board_id, force).await;
        self.state = SyncState::Idle;
        match &outcome {
            Ok(_) => self.error = None,
            Err(err) => self.error = Some(err.to_string()),
        }
        outcome
    }

    async fn sync_inner(&mut self, board_id: &str, force: bool) -> Result<SyncOutcome, SyncError> {
        if !self.provider.is_configured() {
            return Err(crate::error::ProviderError::NotConfigured.into());
        }

        if !force && self.cache.is_valid(board_id, self.cache_ttl) {
            if let Some(snapshot) = self.cache.load(board_id) {
                let overlay = self.status_store.get_all(board_id).await;
                self.publish(snapshot, &overlay);
                return Ok(SyncOutcome::FromCache);
            }
        }

        // All four fetches must succeed; the first failure aborts the sync
        // and the previous snapshot stays published.
        let (cards, members, labels, board) = tokio::try_join!(
            self.provider.get_board_cards(board_id),
            self.provider.get_board_members(board_id),
            self.provider.get_board_labels(board_id),
            self.provider.get_board_info(board_id),
        )?;

        let overlay = self.status_store.get_all(board_id).await;
        let snapshot = BoardSnapshot {
            board,
            cards,
            members,
            labels,
            cached_at: Utc::now(),
        };
        // Cache is advisory; a failed write must not fail the sync
        let _ = self.cache.save(board_id, &snapshot);
        self.publish(snapshot, &overlay);
        Ok(SyncOutcome::Synced)
    }

    /// Replaces the in-memory lists wholesale with the overlay joined onto
    /// every card. Cards present only in the overlay stay orphaned in the
    /// store until `remove_card` cleans them up.
    fn publish(&mut self, mut snapshot: BoardSnapshot, overlay: &HashMap<String, StatusEntry>) {
        for card in &mut snapshot.cards {
            card.local_status = overlay
                .get(&card.id)
                .map(|entry| entry.status)
                .unwrap_or_default();
        }
        self.cards = snapshot.cards;
        self.members = snapshot.members;
        self.labels = snapshot.labels;
        self.board = Some(snapshot.board);
        self.last_sync = Some(snapshot.cached_at);
    }

    /// Starts the recurring unforced sync. Only one timer per service;
    /// starting again cancels the previous one.
    pub fn start_auto_sync(&mut self, board_id: &str, tx: mpsc::UnboundedSender<Action>) {
        self.stop_auto_sync();
        let board_id = board_id.to_string();
        let interval = self.sync_interval;
        self.timer = Some(tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            // The first tick completes immediately; the initial sync is the
            // app's job, not the timer's
            tick.tick().await;
            loop {
                tick.tick().await;
                if tx.send(Action::AutoSync(board_id.clone())).is_err() {
                    break;
                }
            }
        }));
    }

    /// Cancels future scheduled syncs. Idempotent; an in-flight sync runs to
    /// completion.
    pub fn stop_auto_sync(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Persists a status change, then patches the one in-memory card in
    /// place. No re-sync is triggered.
    pub async fn update_card_status(
        &mut self,
        card_id: &str,
        status: CardStatus,
        note: &str,
    ) -> Result<(), SyncError> {
        let workspace = self.workspace.clone().ok_or(SyncError::NoWorkspace)?;
        self.status_store
            .set_status(&workspace, card_id, status, &self.editor_id, note)
            .await
            .map_err(SyncError::Store)?;
        if let Some(card) = self.cards.iter_mut().find(|c| c.id == card_id) {
            card.local_status = status;
        }
        Ok(())
    }

    /// Drops a card's overlay entry and history. For reconciling cards that
    /// disappeared from the remote board; never called automatically.
    pub async fn remove_card(&mut self, card_id: &str) -> Result<(), SyncError> {
        let workspace = self.workspace.clone().ok_or(SyncError::NoWorkspace)?;
        self.status_store
            .remove_card(&workspace, card_id)
            .await
            .map_err(SyncError::Store)
    }

    pub async fn card_history(&self, card_id: &str) -> Vec<StatusHistoryEntry> {
        match &self.workspace {
            Some(workspace) => self.status_store.get_history(workspace, card_id).await,
            None => Vec::new(),
        }
    }
}

impl Drop for SyncService {
    fn drop(&mut self) {
        self.stop_auto_sync();
    }
}
