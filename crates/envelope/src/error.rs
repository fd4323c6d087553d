//! Envelope decoding failures.

/// Errors raised while encoding or decoding an envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    /// The response body was valid JSON but not an object.
    #[error("envelope must be a JSON object")]
    NotAnObject,
    /// The resource field named by [`crate::EnvelopeFields`] was absent.
    #[error("envelope is missing the `{field}` field")]
    MissingField {
        /// Name of the absent field.
        field: &'static str,
    },
    /// The body or payload failed to (de)serialise.
    #[error("envelope payload is invalid: {message}")]
    Json {
        /// Serde error description.
        message: String,
    },
}

impl EnvelopeError {
    pub(crate) fn json(error: &serde_json::Error) -> Self {
        Self::Json {
            message: error.to_string(),
        }
    }
}
