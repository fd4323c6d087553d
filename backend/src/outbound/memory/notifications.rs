//! In-memory notifications collection.

use std::sync::Mutex;

use async_trait::async_trait;

use super::lock;
use crate::domain::ports::{NotificationPersistenceError, NotificationRepository};
use crate::domain::{NotificationChanges, NotificationRecord, RecordId};

/// [`NotificationRepository`] over a mutex-guarded vector.
#[derive(Debug, Default)]
pub struct MemoryNotificationRepository {
    records: Mutex<Vec<NotificationRecord>>,
}

#[async_trait]
impl NotificationRepository for MemoryNotificationRepository {
    async fn list_newest_first(
        &self,
    ) -> Result<Vec<NotificationRecord>, NotificationPersistenceError> {
        let mut records = lock(&self.records).clone();
        // Equal timestamps list the later insertion first.
        records.reverse();
        records.sort_by(|a, b| b.document.timestamp.cmp(&a.document.timestamp));
        Ok(records)
    }

    async fn insert(
        &self,
        record: NotificationRecord,
    ) -> Result<NotificationRecord, NotificationPersistenceError> {
        lock(&self.records).push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: &RecordId,
        changes: NotificationChanges,
    ) -> Result<Option<NotificationRecord>, NotificationPersistenceError> {
        let mut records = lock(&self.records);
        let Some(record) = records.iter_mut().find(|record| &record.id == id) else {
            return Ok(None);
        };
        changes.apply(&mut record.document);
        Ok(Some(record.clone()))
    }

    async fn delete(
        &self,
        id: &RecordId,
    ) -> Result<Option<NotificationRecord>, NotificationPersistenceError> {
        let mut records = lock(&self.records);
        let position = records.iter().position(|record| &record.id == id);
        Ok(position.map(|index| records.remove(index)))
    }

    async fn clear(&self) -> Result<u64, NotificationPersistenceError> {
        let removed = lock(&self.records).drain(..).count();
        u64::try_from(removed).map_err(|err| NotificationPersistenceError::query(err.to_string()))
    }
}
