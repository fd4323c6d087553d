//! Carts feed adapter.
//!
//! The feed answers `{ "carts": [..], "total", "skip", "limit" }`, which is
//! already a list envelope keyed by `carts`.

use std::time::Duration;

use async_trait::async_trait;
use envelope::{EnvelopeFields, ListEnvelope};
use reqwest::Url;

use super::HttpTransport;
use super::transport::decode_error;
use crate::ports::CartSource;
use crate::{Cart, CartLineItem, ClientError, flatten_carts};

/// Envelope field names for the carts feed.
pub const CARTS: EnvelopeFields = EnvelopeFields::new("carts", "cart");

/// [`CartSource`] reading one fixed feed URL.
#[derive(Debug, Clone)]
pub struct CartsFeed {
    transport: HttpTransport,
}

impl CartsFeed {
    /// Read carts from `url`, query string included.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] when the transport cannot be
    /// built.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            transport: HttpTransport::new(url, timeout)?,
        })
    }
}

#[async_trait]
impl CartSource for CartsFeed {
    async fn fetch_items(&self) -> Result<Vec<CartLineItem>, ClientError> {
        let (status, body) = self.transport.fetch_raw(self.transport.base().clone()).await?;
        let envelope: ListEnvelope<Cart> =
            ListEnvelope::from_slice(&body, CARTS).map_err(|error| decode_error(status, &error))?;
        Ok(flatten_carts(envelope.items))
    }
}
