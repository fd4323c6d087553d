//! Authoritative client-side user list.
//!
//! Every mutation goes to the users resource first; the local list changes
//! only after the server succeeded, and each success is followed by exactly
//! one notification. Deletion is the exception to "one call per operation":
//! [`UserStore::delete`] opens a confirmation window, and the network delete
//! happens only once [`UserStore::confirm_delete`] accepts it. A successful
//! delete then opens an undo window handled by [`UserStore::undo_delete`].

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::watch;
use tracing::{info, warn};

use super::delete_flow::{
    DeleteFlow, DeleteOutcome, DeletePrompt, DeleteTarget, DeleteTicket, RemovedUser, TimerLease,
    UndoClaim,
};
use super::NotificationStore;
use crate::persist::PersistedState;
use crate::ports::UserResource;
use crate::timer::spawn_countdown;
use crate::{ClientError, NotificationKind, User, UserId, UserPatch};

/// Label used when the target of a delete is not in the local list.
pub const FALLBACK_LABEL: &str = "User";
/// Undo text used when the delete response carries no toast.
pub const DEFAULT_UNDO_MESSAGE: &str = "User deleted";

/// How an undo restores a deleted user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndoPolicy {
    /// Re-create the record on the server under its original id.
    #[default]
    Recreate,
    /// Restore the local copy only; the server keeps the deletion.
    LocalOnly,
}

impl FromStr for UndoPolicy {
    type Err = ClientError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "recreate" => Ok(Self::Recreate),
            "local_only" | "local-only" => Ok(Self::LocalOnly),
            other => Err(ClientError::invalid_config(format!(
                "unknown undo policy `{other}`; expected `recreate` or `local_only`"
            ))),
        }
    }
}

/// Timing and undo behaviour of the delete flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteFlowSettings {
    /// Ticks in both the confirmation and the undo window.
    pub countdown_ticks: u32,
    /// Length of one tick.
    pub tick: Duration,
    /// What undo does.
    pub undo_policy: UndoPolicy,
}

impl Default for DeleteFlowSettings {
    fn default() -> Self {
        Self {
            countdown_ticks: 5,
            tick: Duration::from_secs(1),
            undo_policy: UndoPolicy::Recreate,
        }
    }
}

/// Result of a confirm click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The server deleted the user and the undo window opened.
    Deleted,
    /// Nothing was awaiting confirmation.
    Ignored,
}

/// Result of an undo click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The user is back in the list.
    Restored,
    /// No undo window was open.
    Ignored,
}

struct UserState {
    users: Vec<User>,
    loading: bool,
    flow: DeleteFlow,
}

struct UserStoreInner {
    api: Arc<dyn UserResource>,
    notifications: NotificationStore,
    settings: DeleteFlowSettings,
    snapshot: Option<PersistedState<Vec<User>>>,
    state: Mutex<UserState>,
    prompt: watch::Sender<DeletePrompt>,
}

impl UserStoreInner {
    fn lock(&self) -> MutexGuard<'_, UserState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &UserState) {
        self.prompt.send_replace(state.flow.prompt());
    }

    /// Copy of the list to persist, taken under the state lock.
    fn pending_snapshot(&self, state: &UserState) -> Option<Vec<User>> {
        self.snapshot.as_ref().map(|_| state.users.clone())
    }

    /// Write a copy from [`Self::pending_snapshot`] once the lock is released.
    fn write_snapshot(&self, pending: Option<Vec<User>>) {
        if let (Some(snapshot), Some(users)) = (&self.snapshot, pending)
            && let Err(error) = snapshot.save(&users)
        {
            warn!(%error, "failed to persist user snapshot");
        }
    }

    fn start_confirm_countdown(self: &Arc<Self>, lease: TimerLease) {
        let inner = Arc::clone(self);
        let TimerLease { epoch, token } = lease;
        drop(spawn_countdown(self.settings.countdown_ticks, self.settings.tick, token, move |left| {
            let mut state = inner.lock();
            if state.flow.confirm_tick(epoch, left) {
                inner.publish(&state);
                if left == 0 {
                    info!("delete confirmation lapsed");
                }
            }
        }));
    }

    fn start_undo_countdown(self: &Arc<Self>, lease: TimerLease) {
        let inner = Arc::clone(self);
        let TimerLease { epoch, token } = lease;
        drop(spawn_countdown(self.settings.countdown_ticks, self.settings.tick, token, move |left| {
            let mut state = inner.lock();
            if state.flow.undo_tick(epoch, left) {
                inner.publish(&state);
                if left == 0 {
                    info!("delete finalized");
                }
            }
        }));
    }
}

impl Drop for UserStoreInner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.flow.abandon();
    }
}

/// Configures a [`UserStore`].
pub struct UserStoreBuilder {
    api: Arc<dyn UserResource>,
    notifications: NotificationStore,
    settings: DeleteFlowSettings,
    snapshot: Option<PersistedState<Vec<User>>>,
}

impl UserStoreBuilder {
    /// Override the delete flow timing and undo policy.
    #[must_use]
    pub const fn settings(mut self, settings: DeleteFlowSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Mirror the list to a snapshot after every change.
    #[must_use]
    pub fn snapshot(mut self, snapshot: PersistedState<Vec<User>>) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Finish the store with an empty list.
    #[must_use]
    pub fn build(self) -> UserStore {
        let (prompt, _) = watch::channel(DeletePrompt::Hidden);
        UserStore {
            inner: Arc::new(UserStoreInner {
                api: self.api,
                notifications: self.notifications,
                settings: self.settings,
                snapshot: self.snapshot,
                state: Mutex::new(UserState {
                    users: Vec::new(),
                    loading: false,
                    flow: DeleteFlow::new(),
                }),
                prompt,
            }),
        }
    }
}

/// Shared handle to the user list.
#[derive(Clone)]
pub struct UserStore {
    inner: Arc<UserStoreInner>,
}

impl UserStore {
    /// Start configuring a store over `api` that reports to `notifications`.
    #[must_use]
    pub fn builder(api: Arc<dyn UserResource>, notifications: NotificationStore) -> UserStoreBuilder {
        UserStoreBuilder {
            api,
            notifications,
            settings: DeleteFlowSettings::default(),
            snapshot: None,
        }
    }

    /// Current users in server order.
    #[must_use]
    pub fn users(&self) -> Vec<User> {
        self.inner.lock().users.clone()
    }

    /// Look up one user.
    #[must_use]
    pub fn find(&self, id: &UserId) -> Option<User> {
        self.inner
            .lock()
            .users
            .iter()
            .find(|user| user.has_id(id))
            .cloned()
    }

    /// Whether a list fetch is running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.lock().loading
    }

    /// The delete prompt as it stands now.
    #[must_use]
    pub fn prompt(&self) -> DeletePrompt {
        self.inner.prompt.borrow().clone()
    }

    /// Follow delete prompt changes, one value per tick or transition.
    #[must_use]
    pub fn subscribe_prompt(&self) -> watch::Receiver<DeletePrompt> {
        self.inner.prompt.subscribe()
    }

    /// Seed the list from the snapshot written by a previous session.
    /// Returns how many users were restored.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Persistence`] when the snapshot is unreadable.
    pub fn hydrate_from_snapshot(&self) -> Result<usize, ClientError> {
        let Some(snapshot) = &self.inner.snapshot else {
            return Ok(0);
        };
        let users = snapshot.load()?.unwrap_or_default();
        let count = users.len();
        self.inner.lock().users = users;
        Ok(count)
    }

    /// Replace the list with the server's.
    ///
    /// # Errors
    ///
    /// Propagates the fetch failure; the list is left as it was.
    pub async fn load(&self) -> Result<(), ClientError> {
        self.inner.lock().loading = true;
        let result = self.inner.api.list().await;
        let pending = {
            let mut state = self.inner.lock();
            state.loading = false;
            match result {
                Ok(reply) => {
                    state.users = reply.value;
                    info!(count = state.users.len(), "users loaded");
                    self.inner.pending_snapshot(&state)
                }
                Err(error) => {
                    warn!(%error, "failed to load users");
                    return Err(error);
                }
            }
        };
        self.inner.write_snapshot(pending);
        Ok(())
    }

    /// Persist a new user and append it to the list.
    ///
    /// # Errors
    ///
    /// Propagates the create failure; the list is unchanged.
    pub async fn create(&self, candidate: User) -> Result<User, ClientError> {
        let reply = self
            .inner
            .api
            .create(&candidate)
            .await
            .inspect_err(|error| warn!(%error, "failed to create user"))?;
        let user = reply.value;
        let pending = {
            let mut state = self.inner.lock();
            upsert(&mut state.users, user.clone());
            self.inner.pending_snapshot(&state)
        };
        self.inner.write_snapshot(pending);
        self.notify(
            NotificationKind::Add,
            format!("User \"{}\" added successfully", user.name()),
        )
        .await;
        Ok(user)
    }

    /// Apply `patch` on the server and replace the local record in place.
    ///
    /// # Errors
    ///
    /// Propagates the update failure; the list is unchanged.
    pub async fn update(&self, id: &UserId, patch: &UserPatch) -> Result<User, ClientError> {
        let reply = self
            .inner
            .api
            .update(id, patch)
            .await
            .inspect_err(|error| warn!(%error, user_id = %id, "failed to update user"))?;
        let mut user = reply.value;
        user.id = Some(id.clone());
        let pending = {
            let mut state = self.inner.lock();
            if let Some(slot) = state.users.iter_mut().find(|existing| existing.has_id(id)) {
                *slot = user.clone();
            }
            self.inner.pending_snapshot(&state)
        };
        self.inner.write_snapshot(pending);
        self.notify(
            NotificationKind::Update,
            format!("User \"{}\" updated successfully", user.name()),
        )
        .await;
        Ok(user)
    }

    /// Ask for confirmation before deleting `id`. Nothing is sent to the
    /// server until [`Self::confirm_delete`]; the prompt lapses after the
    /// configured countdown. An open undo window from a previous delete is
    /// finalized.
    ///
    /// Must be called from within a Tokio runtime; the countdown runs as a
    /// spawned task.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::DeleteFlowBusy`] while another delete awaits
    /// confirmation or is in flight.
    pub fn delete(&self, id: &UserId) -> Result<DeleteTicket, ClientError> {
        let lease_and_ticket = {
            let mut state = self.inner.lock();
            let label = state
                .users
                .iter()
                .find(|user| user.has_id(id))
                .map_or_else(|| FALLBACK_LABEL.to_owned(), |user| user.name().to_owned());
            let target = DeleteTarget {
                id: id.clone(),
                label,
            };
            let started = state.flow.begin(target, self.inner.settings.countdown_ticks);
            self.inner.publish(&state);
            started
        };
        let (lease, ticket) = lease_and_ticket.inspect_err(|error| {
            warn!(%error, user_id = %id, "delete rejected");
        })?;
        self.inner.start_confirm_countdown(lease);
        info!(user_id = %id, "delete awaiting confirmation");
        Ok(ticket)
    }

    /// Accept the pending confirmation: delete on the server, drop the local
    /// record, notify, and open the undo window.
    ///
    /// # Errors
    ///
    /// Propagates the delete failure; the record stays in the list and the
    /// flow ends.
    pub async fn confirm_delete(&self) -> Result<ConfirmOutcome, ClientError> {
        let target = {
            let mut state = self.inner.lock();
            let Some(target) = state.flow.confirm() else {
                return Ok(ConfirmOutcome::Ignored);
            };
            self.inner.publish(&state);
            target
        };

        let reply = match self.inner.api.delete(&target.id).await {
            Ok(reply) => reply,
            Err(error) => {
                warn!(%error, user_id = %target.id, "failed to delete user");
                let mut state = self.inner.lock();
                state.flow.deletion_failed(&target.id, error.clone());
                self.inner.publish(&state);
                return Err(error);
            }
        };

        let message = reply.toast_message_or(DEFAULT_UNDO_MESSAGE);
        let (lease, pending) = {
            let mut state = self.inner.lock();
            let removed = remove(&mut state.users, &target.id);
            let pending = self.inner.pending_snapshot(&state);
            let lease =
                state
                    .flow
                    .deletion_succeeded(
                        &target.id,
                        removed,
                        message,
                        self.inner.settings.countdown_ticks,
                    );
            self.inner.publish(&state);
            (lease, pending)
        };
        self.inner.write_snapshot(pending);
        if let Some(lease) = lease {
            self.inner.start_undo_countdown(lease);
        }
        info!(user_id = %target.id, "user deleted");
        self.notify(
            NotificationKind::Delete,
            format!("User \"{}\" deleted successfully", target.label),
        )
        .await;
        Ok(ConfirmOutcome::Deleted)
    }

    /// Undo the last delete while its window is open, restoring the record
    /// at its former position.
    ///
    /// # Errors
    ///
    /// Under [`UndoPolicy::Recreate`], propagates the re-create failure; the
    /// record stays deleted.
    pub async fn undo_delete(&self) -> Result<UndoOutcome, ClientError> {
        let claim = {
            let mut state = self.inner.lock();
            let Some(claim) = state.flow.take_for_undo() else {
                return Ok(UndoOutcome::Ignored);
            };
            self.inner.publish(&state);
            claim
        };
        let UndoClaim {
            removed,
            mut resolver,
        } = claim;
        let RemovedUser { user, position } = removed;

        let restored = match self.inner.settings.undo_policy {
            UndoPolicy::LocalOnly => user,
            UndoPolicy::Recreate => match self.inner.api.create(&user).await {
                Ok(reply) => reply.value,
                Err(error) => {
                    warn!(%error, "failed to re-create user on undo");
                    resolver.resolve(DeleteOutcome::Failed(error.clone()));
                    return Err(error);
                }
            },
        };

        let pending = {
            let mut state = self.inner.lock();
            restore(&mut state.users, restored, position);
            self.inner.pending_snapshot(&state)
        };
        self.inner.write_snapshot(pending);
        resolver.resolve(DeleteOutcome::Restored);
        info!("user deletion undone");
        Ok(UndoOutcome::Restored)
    }

    async fn notify(&self, kind: NotificationKind, message: String) {
        if let Err(error) = self.inner.notifications.append(kind, message).await {
            warn!(%error, %kind, "notification not recorded");
        }
    }
}

/// Replace the record with the same id, or append.
fn upsert(users: &mut Vec<User>, user: User) {
    let existing = user
        .id
        .as_ref()
        .and_then(|id| users.iter().position(|candidate| candidate.has_id(id)));
    match existing.and_then(|index| users.get_mut(index)) {
        Some(slot) => *slot = user,
        None => users.push(user),
    }
}

fn remove(users: &mut Vec<User>, id: &UserId) -> Option<RemovedUser> {
    let position = users.iter().position(|user| user.has_id(id))?;
    Some(RemovedUser {
        user: users.remove(position),
        position,
    })
}

/// Reinsert at `position`, clamped to the list; a record whose id is already
/// present again is not duplicated.
fn restore(users: &mut Vec<User>, user: User, position: usize) {
    if let Some(id) = &user.id
        && users.iter().any(|existing| existing.has_id(id))
    {
        return;
    }
    let index = position.min(users.len());
    users.insert(index, user);
}

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;
