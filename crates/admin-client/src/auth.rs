//! Signed-in operator session.
//!
//! The session is a tiny JSON document in the state directory so a restart of
//! the CLI keeps the operator signed in. Credentials are not checked against a
//! backend: any non-empty email and password open a session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ClientError;
use crate::persist::PersistedState;

/// Id given to every session opened through [`AuthStore::login`].
const LOGIN_USER_ID: &str = "1";

/// Operator identity shown in the dashboard header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Session user id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Sign-in email.
    pub email: String,
}

/// Persisted session record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// Signed-in operator, if any.
    #[serde(default)]
    pub user: Option<AuthUser>,
    /// Whether routes behind the gate are reachable.
    #[serde(default)]
    pub is_authenticated: bool,
}

struct AuthInner {
    storage: Option<PersistedState<AuthSession>>,
    session: Mutex<AuthSession>,
}

impl AuthInner {
    fn lock(&self) -> MutexGuard<'_, AuthSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(&self, next: AuthSession) -> Result<(), ClientError> {
        if let Some(storage) = &self.storage {
            storage
                .save(&next)
                .inspect_err(|error| warn!(%error, "failed to persist session"))?;
        }
        *self.lock() = next;
        Ok(())
    }
}

/// Shared handle to the session.
#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<AuthInner>,
}

impl AuthStore {
    /// Session kept in memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_parts(None, AuthSession::default())
    }

    /// Session backed by `storage`, resumed from it when present.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Persistence`] when the stored session is
    /// unreadable.
    pub fn persisted(storage: PersistedState<AuthSession>) -> Result<Self, ClientError> {
        let session = storage.load()?.unwrap_or_default();
        Ok(Self::from_parts(Some(storage), session))
    }

    fn from_parts(storage: Option<PersistedState<AuthSession>>, session: AuthSession) -> Self {
        Self {
            inner: Arc::new(AuthInner {
                storage,
                session: Mutex::new(session),
            }),
        }
    }

    /// Current session.
    #[must_use]
    pub fn session(&self) -> AuthSession {
        self.inner.lock().clone()
    }

    /// Whether an operator is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.lock().is_authenticated
    }

    /// Open a session for `email`. Returns `false`, leaving the session as
    /// it was, when either credential is blank.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Persistence`] when the session cannot be saved.
    pub fn login(&self, email: &str, password: &str) -> Result<bool, ClientError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Ok(false);
        }
        let name = email.split('@').next().unwrap_or(email).to_owned();
        self.set_user(AuthUser {
            id: LOGIN_USER_ID.to_owned(),
            name,
            email: email.to_owned(),
        })?;
        info!(%email, "signed in");
        Ok(true)
    }

    /// Mark `user` as the signed-in operator.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Persistence`] when the session cannot be saved.
    pub fn set_user(&self, user: AuthUser) -> Result<(), ClientError> {
        self.inner.replace(AuthSession {
            user: Some(user),
            is_authenticated: true,
        })
    }

    /// End the session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Persistence`] when the session cannot be saved.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.inner.replace(AuthSession::default())?;
        info!("signed out");
        Ok(())
    }

    /// Gate for operations behind sign-in.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthenticated`] when nobody is signed in.
    pub fn require_authenticated(&self) -> Result<AuthUser, ClientError> {
        let session = self.inner.lock();
        match &session.user {
            Some(user) if session.is_authenticated => Ok(user.clone()),
            _ => Err(ClientError::Unauthenticated),
        }
    }
}
