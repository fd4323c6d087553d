//! Records exchanged with the backend and the carts feed.

mod cart;
mod notification;
mod user;

pub use cart::{Cart, CartLineItem, CartProduct, flatten_carts};
pub use notification::{
    NewNotification, Notification, NotificationId, NotificationKind, NotificationPatch,
};
pub use user::{NAME_MIN, PHONE_MIN, User, UserFields, UserId, UserPatch};
