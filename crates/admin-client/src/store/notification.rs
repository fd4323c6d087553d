//! Newest-first notification list with a transient popup.
//!
//! The store runs in one of two modes. Local mode keeps everything in memory
//! and generates ids. Persisted mode mirrors each mutation to the
//! notifications resource and only applies it locally once the server
//! acknowledged it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use mockable::Clock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::ports::NotificationResource;
use crate::timer::spawn_delay;
use crate::{
    ClientError, NewNotification, Notification, NotificationId, NotificationKind,
    NotificationPatch,
};

/// Default number of notifications kept.
pub const DEFAULT_NOTIFICATION_CAP: usize = 10;
/// Default popup lifetime.
pub const DEFAULT_POPUP_HIDE: Duration = Duration::from_secs(4);

/// Retention and popup behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationSettings {
    /// Maximum notifications kept; `None` keeps everything.
    pub cap: Option<usize>,
    /// How long the popup stays visible after an append.
    pub popup_hide: Duration,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            cap: Some(DEFAULT_NOTIFICATION_CAP),
            popup_hide: DEFAULT_POPUP_HIDE,
        }
    }
}

#[derive(Debug, Default)]
struct NotificationState {
    notifications: Vec<Notification>,
    popup_visible: bool,
    popup_timer: Option<CancellationToken>,
}

impl NotificationState {
    fn cancel_popup(&mut self) {
        if let Some(token) = self.popup_timer.take() {
            token.cancel();
        }
        self.popup_visible = false;
    }
}

struct NotificationInner {
    mirror: Option<Arc<dyn NotificationResource>>,
    clock: Arc<dyn Clock + Send + Sync>,
    settings: NotificationSettings,
    state: Mutex<NotificationState>,
}

impl NotificationInner {
    fn lock(&self) -> MutexGuard<'_, NotificationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared handle to the notification list.
#[derive(Clone)]
pub struct NotificationStore {
    inner: Arc<NotificationInner>,
}

impl NotificationStore {
    /// In-memory store with locally generated ids.
    #[must_use]
    pub fn local(clock: Arc<dyn Clock + Send + Sync>, settings: NotificationSettings) -> Self {
        Self::with_mirror(None, clock, settings)
    }

    /// Store mirroring every mutation to `resource`.
    #[must_use]
    pub fn persisted(
        resource: Arc<dyn NotificationResource>,
        clock: Arc<dyn Clock + Send + Sync>,
        settings: NotificationSettings,
    ) -> Self {
        Self::with_mirror(Some(resource), clock, settings)
    }

    fn with_mirror(
        mirror: Option<Arc<dyn NotificationResource>>,
        clock: Arc<dyn Clock + Send + Sync>,
        settings: NotificationSettings,
    ) -> Self {
        Self {
            inner: Arc::new(NotificationInner {
                mirror,
                clock,
                settings,
                state: Mutex::new(NotificationState::default()),
            }),
        }
    }

    /// Whether mutations go through the server.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.inner.mirror.is_some()
    }

    /// Notifications, newest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.lock().notifications.clone()
    }

    /// Most recent notification.
    #[must_use]
    pub fn latest(&self) -> Option<Notification> {
        self.inner.lock().notifications.first().cloned()
    }

    /// Number of notifications not yet read.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.inner
            .lock()
            .notifications
            .iter()
            .filter(|notification| !notification.read)
            .count()
    }

    /// Whether the popup for the latest append is showing.
    #[must_use]
    pub fn is_popup_visible(&self) -> bool {
        self.inner.lock().popup_visible
    }

    /// Replace the list with the server's copy. Local mode has nothing to
    /// load.
    ///
    /// # Errors
    ///
    /// Propagates the resource failure; the list is left untouched.
    pub async fn load(&self) -> Result<(), ClientError> {
        let Some(mirror) = &self.inner.mirror else {
            return Ok(());
        };
        let reply = mirror.list().await.inspect_err(|error| {
            warn!(%error, "failed to load notifications");
        })?;
        let mut notifications = reply.value;
        notifications.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
        self.truncate(&mut notifications);
        self.inner.lock().notifications = notifications;
        Ok(())
    }

    /// Record a notification at the head of the list and show the popup.
    ///
    /// # Errors
    ///
    /// In persisted mode, a failed create leaves the list unchanged.
    pub async fn append(
        &self,
        kind: NotificationKind,
        message: impl Into<String> + Send,
    ) -> Result<Notification, ClientError> {
        let draft = NewNotification::new(kind, message, self.inner.clock.utc());
        let notification = match &self.inner.mirror {
            Some(mirror) => {
                mirror
                    .create(&draft)
                    .await
                    .inspect_err(|error| warn!(%error, %kind, "failed to store notification"))?
                    .value
            }
            None => draft.into_local(),
        };

        let token = CancellationToken::new();
        {
            let mut state = self.inner.lock();
            state.notifications.insert(0, notification.clone());
            self.truncate(&mut state.notifications);
            state.cancel_popup();
            state.popup_visible = true;
            state.popup_timer = Some(token.clone());
        }

        let inner = Arc::clone(&self.inner);
        let timer = token.clone();
        drop(spawn_delay(self.inner.settings.popup_hide, token, move || {
            let mut state = inner.lock();
            if !timer.is_cancelled() {
                state.popup_visible = false;
                state.popup_timer = None;
            }
        }));
        debug!(id = %notification.id, %kind, "notification appended");
        Ok(notification)
    }

    /// Mark one notification as read. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// In persisted mode, propagates the update failure.
    pub async fn mark_as_read(&self, id: &NotificationId) -> Result<(), ClientError> {
        let known_unread = self
            .inner
            .lock()
            .notifications
            .iter()
            .any(|notification| &notification.id == id && !notification.read);
        if !known_unread {
            return Ok(());
        }
        if let Some(mirror) = &self.inner.mirror {
            mirror
                .update(id, &NotificationPatch::mark_read())
                .await
                .inspect_err(|error| warn!(%error, %id, "failed to mark notification read"))?;
        }
        self.set_read(id);
        Ok(())
    }

    /// Mark every notification as read.
    ///
    /// # Errors
    ///
    /// In persisted mode, stops at the first failed update; notifications
    /// acknowledged before it stay marked.
    pub async fn mark_all_as_read(&self) -> Result<(), ClientError> {
        let unread: Vec<NotificationId> = self
            .inner
            .lock()
            .notifications
            .iter()
            .filter(|notification| !notification.read)
            .map(|notification| notification.id.clone())
            .collect();
        for id in &unread {
            if let Some(mirror) = &self.inner.mirror {
                mirror
                    .update(id, &NotificationPatch::mark_read())
                    .await
                    .inspect_err(|error| warn!(%error, %id, "failed to mark notification read"))?;
            }
            self.set_read(id);
        }
        Ok(())
    }

    /// Remove one notification.
    ///
    /// # Errors
    ///
    /// In persisted mode, propagates the delete failure.
    pub async fn remove(&self, id: &NotificationId) -> Result<(), ClientError> {
        if let Some(mirror) = &self.inner.mirror {
            mirror
                .delete(id)
                .await
                .inspect_err(|error| warn!(%error, %id, "failed to delete notification"))?;
        }
        self.inner
            .lock()
            .notifications
            .retain(|notification| &notification.id != id);
        Ok(())
    }

    /// Remove every notification and hide the popup.
    ///
    /// # Errors
    ///
    /// In persisted mode, propagates the clear failure.
    pub async fn clear(&self) -> Result<(), ClientError> {
        if let Some(mirror) = &self.inner.mirror {
            mirror
                .clear()
                .await
                .inspect_err(|error| warn!(%error, "failed to clear notifications"))?;
        }
        let mut state = self.inner.lock();
        state.notifications.clear();
        state.cancel_popup();
        Ok(())
    }

    /// Hide the popup before its timer fires.
    pub fn dismiss_popup(&self) {
        self.inner.lock().cancel_popup();
    }

    fn set_read(&self, id: &NotificationId) {
        if let Some(notification) = self
            .inner
            .lock()
            .notifications
            .iter_mut()
            .find(|notification| &notification.id == id)
        {
            notification.read = true;
        }
    }

    fn truncate(&self, notifications: &mut Vec<Notification>) {
        if let Some(cap) = self.inner.settings.cap
            && cap > 0
        {
            notifications.truncate(cap);
        }
    }
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
