//! Record store abstraction

use crate::game::{GameRecord, RecordId, StoredRecord};
use crate::LibraryError;
use async_trait::async_trait;
use std::sync::Mutex;

/// Schema-light store holding one `Game` record per collection entry
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every record of the game type
    async fn query_all(&self) -> Result<Vec<StoredRecord>, LibraryError>;

    /// Update the record behind `record_id`, or create one when it is `None`
    async fn save(
        &self,
        record_id: Option<&RecordId>,
        record: &GameRecord,
    ) -> Result<RecordId, LibraryError>;

    async fn delete(&self, record_id: &RecordId) -> Result<(), LibraryError>;

    /// Delete several records; not atomic, each id gets its own outcome
    async fn delete_many(
        &self,
        record_ids: &[RecordId],
    ) -> Vec<(RecordId, Result<(), LibraryError>)> {
        let mut outcomes = Vec::with_capacity(record_ids.len());
        for record_id in record_ids {
            outcomes.push((record_id.clone(), self.delete(record_id).await));
        }
        outcomes
    }
}

/// Record store kept in process memory
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: Mutex<Vec<StoredRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredRecord>>, LibraryError> {
        self.records
            .lock()
            .map_err(|_| LibraryError::RemoteSync("record store lock poisoned".into()))
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn query_all(&self) -> Result<Vec<StoredRecord>, LibraryError> {
        Ok(self.lock()?.clone())
    }

    async fn save(
        &self,
        record_id: Option<&RecordId>,
        record: &GameRecord,
    ) -> Result<RecordId, LibraryError> {
        let mut records = self.lock()?;

        if let Some(record_id) = record_id {
            if let Some(existing) = records.iter_mut().find(|r| &r.record_id == record_id) {
                existing.record = record.clone();
                return Ok(record_id.clone());
            }
        }

        let record_id = RecordId::new(uuid::Uuid::new_v4().to_string());
        records.push(StoredRecord {
            record_id: record_id.clone(),
            record: record.clone(),
        });
        Ok(record_id)
    }

    async fn delete(&self, record_id: &RecordId) -> Result<(), LibraryError> {
        let mut records = self.lock()?;
        let position = records
            .iter()
            .position(|r| &r.record_id == record_id)
            .ok_or_else(|| LibraryError::RecordNotFound(record_id.clone()))?;
        records.remove(position);
        Ok(())
    }
}
