//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{RecordId, UserChanges, UserRecord};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message } => "user repository query failed: {message}",
        /// A user already exists under the requested identifier.
        Duplicate { id } => "user {id} already exists",
    }
}

/// Storage for the users collection, in insertion order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every stored user.
    async fn list(&self) -> Result<Vec<UserRecord>, UserPersistenceError>;

    /// Store a new user; fails with `Duplicate` when its id is taken.
    async fn insert(&self, record: UserRecord) -> Result<UserRecord, UserPersistenceError>;

    /// Apply `changes` and return the merged record, or `None` if absent.
    async fn update(
        &self,
        id: &RecordId,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, UserPersistenceError>;

    /// Remove a user, returning what was removed.
    async fn delete(&self, id: &RecordId) -> Result<Option<UserRecord>, UserPersistenceError>;
}
