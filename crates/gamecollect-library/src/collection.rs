//! The user's collection: local store, record-store mirror and snapshot file

use crate::game::{Game, RecordId};
use crate::snapshot::SnapshotFile;
use crate::store::{CollectionEvent, CollectionStore};
use crate::sync::{BulkDeleteReport, CloudSync};
use crate::LibraryError;
use gamecollect_catalog::Platform;
use std::collections::HashMap;
use tokio::sync::broadcast;

/// How a collection change fared against the record store
#[derive(Debug)]
pub enum SyncStatus {
    /// The record store acknowledged the change
    Synced,
    /// Nothing to mirror (ordering is local only)
    LocalOnly,
    /// The local change stands but the record store did not take it
    Diverged(LibraryError),
}

impl SyncStatus {
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncStatus::Synced)
    }

    pub fn error(&self) -> Option<&LibraryError> {
        match self {
            SyncStatus::Diverged(err) => Some(err),
            _ => None,
        }
    }
}

/// Owner of the collection
///
/// Every change lands in the in-memory store first, then the snapshot file,
/// then the record store. Remote failures are logged and reported but never
/// undo the local change.
pub struct GameCollection {
    store: CollectionStore,
    sync: CloudSync,
    snapshot: Option<SnapshotFile>,
}

impl GameCollection {
    pub fn new(sync: CloudSync) -> Self {
        Self {
            store: CollectionStore::new(),
            sync,
            snapshot: None,
        }
    }

    /// Keep a snapshot file up to date after every change
    pub fn with_snapshot(mut self, snapshot: SnapshotFile) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn games(&self) -> &[Game] {
        self.store.games()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CollectionEvent> {
        self.store.subscribe()
    }

    /// Cold start: the record store is authoritative, the snapshot file is
    /// the fallback when it cannot be read
    pub async fn open(&mut self) -> SyncStatus {
        let status = self.load_from_cloud().await;
        if let SyncStatus::Diverged(e) = &status {
            match self.restore_snapshot() {
                Ok(count) => tracing::warn!(
                    "Record store unavailable ({}), using {} games from the snapshot",
                    e,
                    count
                ),
                Err(snapshot_err) => {
                    tracing::error!("Snapshot unreadable as well: {}", snapshot_err)
                }
            }
        }
        status
    }

    /// Load every record; on failure the current collection is kept
    ///
    /// Records carry no platforms, so they are taken from the snapshot
    /// entry with the same record id when there is one.
    pub async fn load_from_cloud(&mut self) -> SyncStatus {
        match self.sync.load_all().await {
            Ok(mut games) => {
                self.fill_platforms(&mut games);
                self.store.replace_all(games);
                self.persist_snapshot();
                SyncStatus::Synced
            }
            Err(e) => {
                tracing::warn!(
                    "Keeping the current {} games after a failed load",
                    self.store.len()
                );
                SyncStatus::Diverged(e)
            }
        }
    }

    fn fill_platforms(&self, games: &mut [Game]) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        let saved = match snapshot.load() {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!("Cannot read platforms from {}: {}", snapshot.path().display(), e);
                return;
            }
        };

        let platforms: HashMap<RecordId, Vec<Platform>> = saved
            .into_iter()
            .filter_map(|g| g.record_id.map(|id| (id, g.platforms)))
            .collect();

        for game in games.iter_mut().filter(|g| g.platforms.is_empty()) {
            if let Some(known) = game.record_id.as_ref().and_then(|id| platforms.get(id)) {
                game.platforms = known.clone();
            }
        }
    }

    /// Replace the collection with the snapshot file's content
    pub fn restore_snapshot(&mut self) -> Result<usize, LibraryError> {
        let Some(snapshot) = &self.snapshot else {
            return Ok(0);
        };
        let games = snapshot.load()?;
        let count = games.len();
        self.store.replace_all(games);
        tracing::info!("Restored {} games from {}", count, snapshot.path().display());
        Ok(count)
    }

    /// Append a game and mirror it
    pub async fn add(&mut self, game: Game) -> SyncStatus {
        if self.store.contains_id(game.id) {
            tracing::warn!("Game {} ({}) is already in the collection", game.id, game.title);
        }

        let index = self.store.add(game);
        self.persist_snapshot();

        let Some(added) = self.store.get(index) else {
            return SyncStatus::LocalOnly;
        };
        let saved = self.sync.save(added).await;
        match saved {
            Ok(record_id) => self.link(index, record_id),
            Err(e) => SyncStatus::Diverged(e),
        }
    }

    fn link(&mut self, index: usize, record_id: RecordId) -> SyncStatus {
        match self.store.link_record(index, record_id) {
            Ok(()) => {
                self.persist_snapshot();
                SyncStatus::Synced
            }
            Err(e) => SyncStatus::Diverged(e),
        }
    }

    pub async fn remove_at(&mut self, index: usize) -> Result<SyncStatus, LibraryError> {
        self.remove_indices(&[index]).await
    }

    /// Remove games and delete their records
    ///
    /// Bad indices fail before anything changes. Remote deletes are attempted
    /// for every removed game; the first failure is reported.
    pub async fn remove_indices(&mut self, indices: &[usize]) -> Result<SyncStatus, LibraryError> {
        let removed = self.store.remove_indices(indices)?;
        self.persist_snapshot();

        let mut first_error = None;
        for game in &removed {
            if let Err(e) = self.sync.delete(game).await {
                first_error.get_or_insert(e);
            }
        }

        Ok(match first_error {
            Some(e) => SyncStatus::Diverged(e),
            None => SyncStatus::Synced,
        })
    }

    pub fn sort_by_title(&mut self) -> SyncStatus {
        self.store.sort_by_title();
        self.persist_snapshot();
        SyncStatus::LocalOnly
    }

    pub fn sort_by_date(&mut self) -> SyncStatus {
        self.store.sort_by_date();
        self.persist_snapshot();
        SyncStatus::LocalOnly
    }

    /// Empty the collection and delete every known record
    pub async fn delete_all(&mut self) -> BulkDeleteReport {
        let games = self.store.clear();
        self.persist_snapshot();

        let unsynced = games.iter().filter(|g| g.record_id.is_none()).count();
        if unsynced > 0 {
            tracing::warn!("{} games had no remote record to delete", unsynced);
        }

        let record_ids: Vec<RecordId> = games.into_iter().filter_map(|g| g.record_id).collect();
        self.sync.bulk_delete(&record_ids).await
    }

    fn persist_snapshot(&self) {
        if let Some(snapshot) = &self.snapshot {
            if let Err(e) = snapshot.save(self.store.games()) {
                tracing::error!("Failed to write {}: {}", snapshot.path().display(), e);
            }
        }
    }
}
