//! Driven ports for the users and notifications collections.
//!
//! Handlers depend on these traits only. Each adapter maps its storage
//! failures onto the typed errors declared next to the trait.

mod macros;
mod notification_repository;
mod user_repository;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationPersistenceError, NotificationRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
