//! In-memory doubles shared by unit and integration tests.
//!
//! The resource fakes behave like the admin backend: they assign ids, honour
//! client-supplied ids on create, and answer with the same toasts. Each call
//! is recorded as `"<VERB> <path>"` so tests can assert the exact requests a
//! store issued.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use envelope::Toast;
use mockable::Clock;
use tokio::sync::Notify;

use crate::ports::{NotificationResource, Reply, UserResource};
use crate::{
    ClientError, NewNotification, Notification, NotificationId, NotificationPatch, User, UserId,
    UserPatch,
};

/// Clock frozen at a settable instant.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock reading `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward.
    ///
    /// # Panics
    ///
    /// Panics when `delta` does not fit a [`TimeDelta`].
    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => panic!("failed to convert Duration to TimeDelta: {error}"),
        };
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

#[derive(Default)]
struct CallLog {
    calls: Vec<String>,
    failures: HashMap<&'static str, ClientError>,
}

impl CallLog {
    fn record(&mut self, verb: &'static str, call: String) -> Result<(), ClientError> {
        self.calls.push(call);
        self.failures.remove(verb).map_or(Ok(()), Err)
    }
}

#[derive(Default)]
struct UsersState {
    users: Vec<User>,
    next_id: u64,
    log: CallLog,
    delete_gate: Option<Arc<Notify>>,
}

/// [`UserResource`] over an in-memory list.
#[derive(Default)]
pub struct InMemoryUsers {
    state: Mutex<UsersState>,
}

impl InMemoryUsers {
    /// Fake server already holding `users`.
    #[must_use]
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            state: Mutex::new(UsersState {
                users,
                ..UsersState::default()
            }),
        }
    }

    /// Requests received so far, e.g. `"DELETE /users/u1"`.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().log.calls.clone()
    }

    /// Records the server currently holds.
    #[must_use]
    pub fn server_users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    /// Fail the next call of `verb` (`list`, `create`, `update`, `delete`).
    pub fn fail_next(&self, verb: &'static str, error: ClientError) {
        self.lock().log.failures.insert(verb, error);
    }

    /// Hold delete requests until the returned handle is notified.
    #[must_use]
    pub fn gate_deletes(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().delete_gate = Some(Arc::clone(&gate));
        gate
    }

    fn lock(&self) -> MutexGuard<'_, UsersState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserResource for InMemoryUsers {
    async fn list(&self) -> Result<Reply<Vec<User>>, ClientError> {
        let mut state = self.lock();
        state.log.record("list", "GET /users".to_owned())?;
        Ok(Reply::bare(state.users.clone()))
    }

    async fn create(&self, user: &User) -> Result<Reply<User>, ClientError> {
        let mut state = self.lock();
        state.log.record("create", "POST /users".to_owned())?;
        let id = match &user.id {
            Some(id) if state.users.iter().any(|existing| existing.has_id(id)) => {
                return Err(ClientError::request_failed(409, "User id already exists"));
            }
            Some(id) => id.clone(),
            None => {
                state.next_id += 1;
                UserId::new(format!("u{}", state.next_id))
            }
        };
        let created = User {
            id: Some(id),
            fields: user.fields.clone(),
        };
        state.users.push(created.clone());
        let toast = Toast::success(format!("User \"{}\" added successfully", created.name()));
        Ok(Reply::new(created, Some(toast)))
    }

    async fn update(&self, id: &UserId, patch: &UserPatch) -> Result<Reply<User>, ClientError> {
        let mut state = self.lock();
        state.log.record("update", format!("PUT /users/{id}"))?;
        let Some(slot) = state.users.iter_mut().find(|user| user.has_id(id)) else {
            return Err(ClientError::request_failed(404, "User not found"));
        };
        slot.fields = patch.apply_to(&slot.fields);
        let updated = slot.clone();
        let toast = Toast::success(format!("User \"{}\" updated successfully", updated.name()));
        Ok(Reply::new(updated, Some(toast)))
    }

    async fn delete(&self, id: &UserId) -> Result<Reply<()>, ClientError> {
        let gate = {
            let mut state = self.lock();
            state.log.record("delete", format!("DELETE /users/{id}"))?;
            state.delete_gate.clone()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let mut state = self.lock();
        let Some(position) = state.users.iter().position(|user| user.has_id(id)) else {
            return Err(ClientError::request_failed(404, "User not found"));
        };
        let removed = state.users.remove(position);
        let toast = Toast::success(format!("User \"{}\" deleted successfully", removed.name()));
        Ok(Reply::new((), Some(toast)))
    }
}

#[derive(Default)]
struct NotificationsState {
    notifications: Vec<Notification>,
    next_id: u64,
    log: CallLog,
}

/// [`NotificationResource`] over an in-memory list.
#[derive(Default)]
pub struct InMemoryNotifications {
    state: Mutex<NotificationsState>,
}

impl InMemoryNotifications {
    /// Requests received so far, e.g. `"PUT /notifications/n1"`.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().log.calls.clone()
    }

    /// Records the server currently holds, newest first.
    #[must_use]
    pub fn server_notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    /// Fail the next call of `verb` (`list`, `create`, `update`, `delete`,
    /// `clear`).
    pub fn fail_next(&self, verb: &'static str, error: ClientError) {
        self.lock().log.failures.insert(verb, error);
    }

    fn lock(&self) -> MutexGuard<'_, NotificationsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl NotificationResource for InMemoryNotifications {
    async fn list(&self) -> Result<Reply<Vec<Notification>>, ClientError> {
        let mut state = self.lock();
        state.log.record("list", "GET /notifications".to_owned())?;
        Ok(Reply::bare(state.notifications.clone()))
    }

    async fn create(&self, notification: &NewNotification) -> Result<Reply<Notification>, ClientError> {
        let mut state = self.lock();
        state.log.record("create", "POST /notifications".to_owned())?;
        state.next_id += 1;
        let stored = Notification {
            id: NotificationId::new(format!("n{}", state.next_id)),
            kind: notification.kind,
            message: notification.message.clone(),
            timestamp: notification.timestamp,
            read: notification.read,
        };
        state.notifications.insert(0, stored.clone());
        Ok(Reply::bare(stored))
    }

    async fn update(
        &self,
        id: &NotificationId,
        patch: &NotificationPatch,
    ) -> Result<Reply<Notification>, ClientError> {
        let mut state = self.lock();
        state.log.record("update", format!("PUT /notifications/{id}"))?;
        let Some(slot) = state
            .notifications
            .iter_mut()
            .find(|notification| &notification.id == id)
        else {
            return Err(ClientError::request_failed(404, "Notification not found"));
        };
        if let Some(read) = patch.read {
            slot.read = read;
        }
        Ok(Reply::bare(slot.clone()))
    }

    async fn delete(&self, id: &NotificationId) -> Result<Reply<()>, ClientError> {
        let mut state = self.lock();
        state.log.record("delete", format!("DELETE /notifications/{id}"))?;
        state
            .notifications
            .retain(|notification| &notification.id != id);
        Ok(Reply::bare(()))
    }

    async fn clear(&self) -> Result<Reply<()>, ClientError> {
        let mut state = self.lock();
        state.log.record("clear", "DELETE /notifications".to_owned())?;
        let cleared = state.notifications.len();
        state.notifications.clear();
        let toast = Toast::success(format!("{cleared} notifications cleared successfully"));
        Ok(Reply::new((), Some(toast)))
    }
}
