//! Client-side sync layer for the admin dashboard.
//!
//! The crate talks to the admin backend through one REST adapter per
//! collection and keeps the authoritative client copy of its data in stores:
//!
//! - [`UserStore`] mirrors the users collection and runs the confirm/undo
//!   delete flow.
//! - [`NotificationStore`] keeps the bounded, newest-first activity feed and
//!   its transient popup.
//! - [`auth::AuthStore`] holds the persisted operator session.
//!
//! [`app::AppState`] wires them together from [`config::ClientSettings`].

pub mod app;
pub mod auth;
pub mod config;
pub mod dashboard;
mod error;
mod model;
pub mod persist;
pub mod ports;
pub mod rest;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod timer;

pub use error::ClientError;
pub use model::{
    Cart, CartLineItem, CartProduct, NAME_MIN, NewNotification, Notification, NotificationId,
    NotificationKind, NotificationPatch, PHONE_MIN, User, UserFields, UserId, UserPatch,
    flatten_carts,
};
pub use store::{
    ConfirmOutcome, DeleteOutcome, DeletePrompt, DeleteTicket, NotificationStore, UndoOutcome,
    UndoPolicy, UserStore,
};
