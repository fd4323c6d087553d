//! Notifications collection adapter.

use std::sync::Arc;

use async_trait::async_trait;
use envelope::EnvelopeFields;
use reqwest::Method;

use super::HttpTransport;
use crate::ports::{NotificationResource, Reply};
use crate::{ClientError, NewNotification, Notification, NotificationId, NotificationPatch};

/// Envelope field names for the notifications resource.
pub const NOTIFICATIONS: EnvelopeFields = EnvelopeFields::new("notifications", "notification");

/// [`NotificationResource`] backed by `/notifications` on the admin backend.
#[derive(Debug, Clone)]
pub struct NotificationsApi {
    transport: Arc<HttpTransport>,
}

impl NotificationsApi {
    /// Wrap a shared transport.
    #[must_use]
    pub const fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl NotificationResource for NotificationsApi {
    async fn list(&self) -> Result<Reply<Vec<Notification>>, ClientError> {
        let url = self.transport.endpoint([NOTIFICATIONS.collection]);
        self.transport.fetch_list(url, NOTIFICATIONS).await
    }

    async fn create(&self, notification: &NewNotification) -> Result<Reply<Notification>, ClientError> {
        let url = self.transport.endpoint([NOTIFICATIONS.collection]);
        self.transport
            .send_record(Method::POST, url, notification, NOTIFICATIONS)
            .await
    }

    async fn update(
        &self,
        id: &NotificationId,
        patch: &NotificationPatch,
    ) -> Result<Reply<Notification>, ClientError> {
        let url = self
            .transport
            .endpoint([NOTIFICATIONS.collection, id.as_str()]);
        self.transport
            .send_record(Method::PUT, url, patch, NOTIFICATIONS)
            .await
    }

    async fn delete(&self, id: &NotificationId) -> Result<Reply<()>, ClientError> {
        let url = self
            .transport
            .endpoint([NOTIFICATIONS.collection, id.as_str()]);
        self.transport.send_ack(Method::DELETE, url).await
    }

    async fn clear(&self) -> Result<Reply<()>, ClientError> {
        let url = self.transport.endpoint([NOTIFICATIONS.collection]);
        self.transport.send_ack(Method::DELETE, url).await
    }
}
