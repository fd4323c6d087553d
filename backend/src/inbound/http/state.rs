//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see domain ports, so
//! tests swap in mocks without touching I/O.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::ports::{NotificationRepository, UserRepository};
use crate::outbound::memory::{MemoryNotificationRepository, MemoryUserRepository};

/// Parameter object bundling the port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub clock: Arc<dyn Clock + Send + Sync>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    /// Stamps notifications created without a timestamp.
    pub clock: Arc<dyn Clock + Send + Sync>,
}

impl HttpState {
    /// Build state from explicit ports.
    #[must_use]
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            users,
            notifications,
            clock,
        } = ports;
        Self {
            users,
            notifications,
            clock,
        }
    }

    /// Empty process-local collections and the system clock.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(HttpStatePorts {
            users: Arc::new(MemoryUserRepository::default()),
            notifications: Arc::new(MemoryNotificationRepository::default()),
            clock: Arc::new(DefaultClock),
        })
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
