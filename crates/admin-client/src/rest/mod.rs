//! Reqwest adapters for the admin backend and the carts feed.

mod carts;
mod notifications;
mod transport;
mod users;

pub use carts::{CARTS, CartsFeed};
pub use notifications::{NOTIFICATIONS, NotificationsApi};
pub use transport::HttpTransport;
pub use users::{USERS, UsersApi};
