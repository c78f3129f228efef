//! Mirrors the collection to a record store
//!
//! Every call is a single attempt: no retries, no backoff and no idempotency
//! keys. A failed write leaves the local collection and the record store out
//! of step until the next full load.

use crate::game::{Game, RECORD_TYPE, RecordId};
use crate::records::RecordStore;
use crate::LibraryError;
use std::sync::Arc;

/// Outcome of a bulk delete
#[derive(Debug, Default)]
pub struct BulkDeleteReport {
    pub deleted: Vec<RecordId>,
    pub failed: Vec<(RecordId, LibraryError)>,
}

impl BulkDeleteReport {
    /// Whether every record was deleted
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Cloud sync adapter over a [`RecordStore`]
#[derive(Clone)]
pub struct CloudSync {
    records: Arc<dyn RecordStore>,
}

impl CloudSync {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    /// Fetch every game record; any error fails the whole load
    pub async fn load_all(&self) -> Result<Vec<Game>, LibraryError> {
        match self.records.query_all().await {
            Ok(stored) => {
                let games: Vec<Game> = stored.into_iter().map(Game::from_stored).collect();
                tracing::info!("Loaded {} {} records from the record store", games.len(), RECORD_TYPE);
                Ok(games)
            }
            Err(e) => {
                tracing::error!("Record store load failed: {}", e);
                Err(e)
            }
        }
    }

    /// Create or update the record for `game`
    pub async fn save(&self, game: &Game) -> Result<RecordId, LibraryError> {
        match self
            .records
            .save(game.record_id.as_ref(), &game.to_record())
            .await
        {
            Ok(record_id) => {
                tracing::info!("Saved game {} as record {}", game.id, record_id);
                Ok(record_id)
            }
            Err(e) => {
                tracing::error!("Saving game {} failed: {}", game.id, e);
                Err(e)
            }
        }
    }

    /// Delete the record behind `game`
    pub async fn delete(&self, game: &Game) -> Result<(), LibraryError> {
        let Some(record_id) = game.record_id.as_ref() else {
            tracing::warn!("Game {} was never saved remotely, nothing to delete", game.id);
            return Err(LibraryError::MissingRecordId(game.id));
        };

        match self.records.delete(record_id).await {
            Ok(()) => {
                tracing::info!("Deleted record {} (game {})", record_id, game.id);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Deleting record {} failed: {}", record_id, e);
                Err(e)
            }
        }
    }

    /// Delete many records; a failure part way leaves the rest in place
    pub async fn bulk_delete(&self, record_ids: &[RecordId]) -> BulkDeleteReport {
        let mut report = BulkDeleteReport::default();

        for (record_id, outcome) in self.records.delete_many(record_ids).await {
            match outcome {
                Ok(()) => report.deleted.push(record_id),
                Err(e) => {
                    tracing::error!("Bulk delete of record {} failed: {}", record_id, e);
                    report.failed.push((record_id, e));
                }
            }
        }

        tracing::info!(
            "Bulk delete finished: {} deleted, {} failed",
            report.deleted.len(),
            report.failed.len()
        );
        report
    }
}
