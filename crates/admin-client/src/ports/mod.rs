//! Driven ports the stores talk through.
//!
//! Each resource port mirrors one REST collection. Replies carry the decoded
//! payload plus any advisory toast the server attached, so stores can reuse
//! server-provided wording.

mod cart_source;
mod notification_resource;
mod user_resource;

pub use cart_source::{CartSource, FixtureCartSource};
pub use notification_resource::NotificationResource;
pub use user_resource::UserResource;

#[cfg(test)]
pub use cart_source::MockCartSource;
#[cfg(test)]
pub use notification_resource::MockNotificationResource;
#[cfg(test)]
pub use user_resource::MockUserResource;

use envelope::Toast;

/// A decoded response body plus its advisory toast.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    /// Decoded payload.
    pub value: T,
    /// Advisory message attached by the server, if any.
    pub toast: Option<Toast>,
}

impl<T> Reply<T> {
    /// Pair a payload with an optional toast.
    #[must_use]
    pub const fn new(value: T, toast: Option<Toast>) -> Self {
        Self { value, toast }
    }

    /// Payload without a toast.
    #[must_use]
    pub const fn bare(value: T) -> Self {
        Self { value, toast: None }
    }

    /// Toast text, or `fallback` when the server sent none.
    #[must_use]
    pub fn toast_message_or(&self, fallback: &str) -> String {
        self.toast
            .as_ref()
            .map_or_else(|| fallback.to_owned(), |toast| toast.message.clone())
    }
}
