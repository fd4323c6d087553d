//! Users collection adapter.

use std::sync::Arc;

use async_trait::async_trait;
use envelope::EnvelopeFields;
use reqwest::Method;

use super::HttpTransport;
use crate::ports::{Reply, UserResource};
use crate::{ClientError, User, UserId, UserPatch};

/// Envelope field names for the users resource.
pub const USERS: EnvelopeFields = EnvelopeFields::new("users", "user");

/// [`UserResource`] backed by `/users` on the admin backend.
#[derive(Debug, Clone)]
pub struct UsersApi {
    transport: Arc<HttpTransport>,
}

impl UsersApi {
    /// Wrap a shared transport.
    #[must_use]
    pub const fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl UserResource for UsersApi {
    async fn list(&self) -> Result<Reply<Vec<User>>, ClientError> {
        let url = self.transport.endpoint([USERS.collection]);
        self.transport.fetch_list(url, USERS).await
    }

    async fn create(&self, user: &User) -> Result<Reply<User>, ClientError> {
        let url = self.transport.endpoint([USERS.collection]);
        self.transport
            .send_record(Method::POST, url, user, USERS)
            .await
    }

    async fn update(&self, id: &UserId, patch: &UserPatch) -> Result<Reply<User>, ClientError> {
        let url = self.transport.endpoint([USERS.collection, id.as_str()]);
        self.transport
            .send_record(Method::PUT, url, patch, USERS)
            .await
    }

    async fn delete(&self, id: &UserId) -> Result<Reply<()>, ClientError> {
        let url = self.transport.endpoint([USERS.collection, id.as_str()]);
        self.transport.send_ack(Method::DELETE, url).await
    }
}
