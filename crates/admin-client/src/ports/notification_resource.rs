//! Driven port for the notifications collection.

use async_trait::async_trait;

use super::Reply;
use crate::{ClientError, NewNotification, Notification, NotificationId, NotificationPatch};

/// Port backing the notification store in persisted mode.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationResource: Send + Sync {
    /// Fetch stored notifications, newest first.
    async fn list(&self) -> Result<Reply<Vec<Notification>>, ClientError>;

    /// Store a new notification.
    async fn create(&self, notification: &NewNotification) -> Result<Reply<Notification>, ClientError>;

    /// Patch one notification.
    async fn update(
        &self,
        id: &NotificationId,
        patch: &NotificationPatch,
    ) -> Result<Reply<Notification>, ClientError>;

    /// Remove one notification.
    async fn delete(&self, id: &NotificationId) -> Result<Reply<()>, ClientError>;

    /// Remove every notification.
    async fn clear(&self) -> Result<Reply<()>, ClientError>;
}
