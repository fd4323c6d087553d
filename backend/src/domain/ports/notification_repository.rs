//! Port abstraction for notification persistence adapters.
use async_trait::async_trait;

use crate::domain::{NotificationChanges, NotificationRecord, RecordId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by notification repository adapters.
    pub enum NotificationPersistenceError {
        /// Repository connection could not be established.
        Connection { message } => "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message } => "notification repository query failed: {message}",
    }
}

/// Storage for the notifications collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Every notification, newest timestamp first.
    async fn list_newest_first(&self) -> Result<Vec<NotificationRecord>, NotificationPersistenceError>;

    /// Store a new notification.
    async fn insert(
        &self,
        record: NotificationRecord,
    ) -> Result<NotificationRecord, NotificationPersistenceError>;

    /// Apply `changes` and return the merged record, or `None` if absent.
    async fn update(
        &self,
        id: &RecordId,
        changes: NotificationChanges,
    ) -> Result<Option<NotificationRecord>, NotificationPersistenceError>;

    /// Remove one notification, returning what was removed.
    async fn delete(
        &self,
        id: &RecordId,
    ) -> Result<Option<NotificationRecord>, NotificationPersistenceError>;

    /// Remove every notification, returning how many there were.
    async fn clear(&self) -> Result<u64, NotificationPersistenceError>;
}
