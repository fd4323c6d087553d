//! Advisory display messages attached to envelopes.

use serde::{Deserialize, Serialize};

/// Display category for a [`Toast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    /// The mutation succeeded.
    Success,
    /// The request failed.
    Error,
    /// Neutral information. Unknown categories decode to this variant.
    #[serde(other)]
    Info,
}

/// Transient message a server suggests the client display.
///
/// # Examples
/// ```
/// use envelope::{Toast, ToastKind};
///
/// let toast = Toast::success("User \"Ada\" added successfully");
/// assert_eq!(toast.kind, ToastKind::Success);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    /// Display category.
    #[serde(rename = "type")]
    pub kind: ToastKind,
    /// Human-readable text.
    pub message: String,
}

impl Toast {
    /// Build a toast of the given kind.
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build a [`ToastKind::Success`] toast.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, message)
    }

    /// Build a [`ToastKind::Error`] toast.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, message)
    }

    /// Build a [`ToastKind::Info`] toast.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, message)
    }
}
