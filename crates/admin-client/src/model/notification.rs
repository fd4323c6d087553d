//! Activity notifications recorded after successful user mutations.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification identifier; server ids in persisted mode, generated locally
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh locally unique identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which mutation produced the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// A user was created.
    Add,
    /// A user was edited.
    Update,
    /// A user was removed.
    Delete,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// A recorded notification, newest first in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Stable identifier; `_id` on the wire, `id` accepted for local records.
    #[serde(rename = "_id", alias = "id")]
    pub id: NotificationId,
    /// Originating mutation.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Display text.
    pub message: String,
    /// Creation instant.
    pub timestamp: DateTime<Utc>,
    /// Whether the operator has seen it.
    #[serde(default)]
    pub read: bool,
}

/// Body of `POST /notifications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    /// Originating mutation.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Display text.
    pub message: String,
    /// Creation instant.
    pub timestamp: DateTime<Utc>,
    /// Always `false` on creation.
    pub read: bool,
}

impl NewNotification {
    /// Unread notification stamped at `timestamp`.
    pub fn new(kind: NotificationKind, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp,
            read: false,
        }
    }

    /// Materialise locally under a generated id.
    #[must_use]
    pub fn into_local(self) -> Notification {
        Notification {
            id: NotificationId::generate(),
            kind: self.kind,
            message: self.message,
            timestamp: self.timestamp,
            read: self.read,
        }
    }
}

/// Body of `PUT /notifications/{id}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPatch {
    /// New read flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

impl NotificationPatch {
    /// Patch marking a notification as read.
    #[must_use]
    pub const fn mark_read() -> Self {
        Self { read: Some(true) }
    }
}
