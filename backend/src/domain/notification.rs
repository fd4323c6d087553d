//! Notifications collection records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Error, RecordId};

/// Mutation that produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Add,
    Update,
    Delete,
}

/// Stored notification attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDocument {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

/// A persisted notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(flatten)]
    pub document: NotificationDocument,
}

/// Body of `POST /notifications`; a missing timestamp is stamped on receipt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewNotification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read: bool,
}

impl NewNotification {
    /// Materialise under a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::invalid_request`] for a blank message.
    pub fn into_record(self, now: DateTime<Utc>) -> Result<NotificationRecord, Error> {
        if self.message.trim().is_empty() {
            return Err(Error::invalid_request("message must not be blank"));
        }
        Ok(NotificationRecord {
            id: RecordId::generate(),
            document: NotificationDocument {
                kind: self.kind,
                message: self.message,
                timestamp: self.timestamp.unwrap_or(now),
                read: self.read,
            },
        })
    }
}

/// Body of `PUT /notifications/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NotificationChanges {
    pub read: Option<bool>,
    pub message: Option<String>,
}

impl NotificationChanges {
    /// Overlay the supplied fields onto `document`.
    pub fn apply(self, document: &mut NotificationDocument) {
        if let Some(read) = self.read {
            document.read = read;
        }
        if let Some(message) = self.message {
            document.message = message;
        }
    }
}
