//! Client-side failure taxonomy.
//!
//! Every store and adapter operation returns [`ClientError`]. Errors are
//! `Clone` so a single failure can be both returned to the caller and
//! recorded as the outcome of a background delete flow.

use std::path::Path;

/// Failures surfaced by REST adapters, stores, and persisted state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Transport failure, non-2xx status, or an undecodable body.
    #[error("request failed: {message}")]
    RequestFailed {
        /// HTTP status, when the server answered at all.
        status: Option<u16>,
        /// Server-provided error text or a transport description.
        message: String,
    },
    /// Client-side validation rejected a form before any network call.
    #[error("{field}: {message}")]
    ValidationFailed {
        /// Offending form field.
        field: &'static str,
        /// Human-readable reason.
        message: String,
    },
    /// A delete is already awaiting confirmation or in flight.
    #[error("another delete is already in progress")]
    DeleteFlowBusy,
    /// Reading or writing a persisted snapshot failed.
    #[error("persisted state at {path} unavailable: {message}")]
    Persistence {
        /// File the snapshot lives in.
        path: String,
        /// Underlying IO or serde failure.
        message: String,
    },
    /// The operation requires a signed-in session.
    #[error("not signed in")]
    Unauthenticated,
    /// Settings could not be turned into a working client.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong.
        message: String,
    },
}

impl ClientError {
    /// Build a [`ClientError::RequestFailed`].
    pub fn request_failed(status: impl Into<Option<u16>>, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status: status.into(),
            message: message.into(),
        }
    }

    /// Build a [`ClientError::ValidationFailed`].
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field,
            message: message.into(),
        }
    }

    /// Build a [`ClientError::Persistence`] for `path`.
    pub fn persistence(path: &Path, message: impl std::fmt::Display) -> Self {
        Self::Persistence {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Build a [`ClientError::InvalidConfig`].
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// HTTP status carried by a request failure.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether the server reported the target as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::not_found(ClientError::request_failed(404, "User not found"), true)]
    #[case::server(ClientError::request_failed(500, "boom"), false)]
    #[case::transport(ClientError::request_failed(None, "connection refused"), false)]
    #[case::busy(ClientError::DeleteFlowBusy, false)]
    fn not_found_is_status_driven(#[case] error: ClientError, #[case] expected: bool) {
        assert_eq!(error.is_not_found(), expected);
    }

    #[rstest]
    fn validation_display_names_the_field() {
        let error = ClientError::validation("phone", "Phone number must be at least 10 digits");
        assert_eq!(
            error.to_string(),
            "phone: Phone number must be at least 10 digits"
        );
    }
}
