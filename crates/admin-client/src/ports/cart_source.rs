//! Driven port for the third-party carts feed.

use async_trait::async_trait;

use crate::{CartLineItem, ClientError};

/// Read-only source of cart line items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartSource: Send + Sync {
    /// Fetch all carts and flatten them into line items.
    async fn fetch_items(&self) -> Result<Vec<CartLineItem>, ClientError>;
}

/// Fixture source with no carts.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureCartSource;

#[async_trait]
impl CartSource for FixtureCartSource {
    async fn fetch_items(&self) -> Result<Vec<CartLineItem>, ClientError> {
        Ok(Vec::new())
    }
}
