//! Driven port for the users collection.

use async_trait::async_trait;

use super::Reply;
use crate::{ClientError, User, UserId, UserPatch};

/// Port for listing and mutating users on the server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserResource: Send + Sync {
    /// Fetch every user in server order.
    async fn list(&self) -> Result<Reply<Vec<User>>, ClientError>;

    /// Persist `user`. A candidate carrying an id asks the server to reuse it.
    async fn create(&self, user: &User) -> Result<Reply<User>, ClientError>;

    /// Apply `patch` to the user with `id` and return the stored record.
    async fn update(&self, id: &UserId, patch: &UserPatch) -> Result<Reply<User>, ClientError>;

    /// Remove the user with `id`.
    async fn delete(&self, id: &UserId) -> Result<Reply<()>, ClientError>;
}
