//! Document identifiers.
//!
//! Records are addressed by 24 lowercase hexadecimal characters, the shape
//! dashboard clients already expect from document stores.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation failures for [`RecordId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordIdError {
    /// Wrong number of characters.
    #[error("record id must be {expected} characters, got {actual}")]
    Length { expected: usize, actual: usize },
    /// Contains something other than lowercase hex digits.
    #[error("record id must be lowercase hexadecimal")]
    NotHex,
}

/// Identifier of a stored user or notification.
///
/// # Examples
/// ```
/// use admin_backend::domain::RecordId;
///
/// let id = RecordId::parse("65f1c0ffee00000000000001").expect("valid id");
/// assert_eq!(id.as_str(), "65f1c0ffee00000000000001");
/// assert!(RecordId::parse("u1").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Number of hex characters in an identifier.
    pub const LEN: usize = 24;

    /// Fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        let bytes = Uuid::new_v4().into_bytes();
        Self(hex::encode(&bytes[..Self::LEN / 2]))
    }

    /// Validate `raw` as an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RecordIdError`] when `raw` is not 24 lowercase hex digits.
    pub fn parse(raw: &str) -> Result<Self, RecordIdError> {
        let actual = raw.chars().count();
        if actual != Self::LEN {
            return Err(RecordIdError::Length {
                expected: Self::LEN,
                actual,
            });
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            return Err(RecordIdError::NotHex);
        }
        Ok(Self(raw.to_owned()))
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RecordId {
    type Error = RecordIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn generated_ids_parse() {
        let id = RecordId::generate();
        assert_eq!(RecordId::parse(id.as_str()), Ok(id));
    }

    #[rstest]
    fn generated_ids_differ() {
        assert_ne!(RecordId::generate(), RecordId::generate());
    }

    #[rstest]
    #[case::short("abc", RecordIdError::Length { expected: 24, actual: 3 })]
    #[case::upper("65F1C0FFEE00000000000001", RecordIdError::NotHex)]
    #[case::letters("65f1c0ffee0000000000000z", RecordIdError::NotHex)]
    fn parse_rejects_malformed(#[case] raw: &str, #[case] expected: RecordIdError) {
        assert_eq!(RecordId::parse(raw), Err(expected));
    }

    #[rstest]
    fn deserialising_validates() {
        let bad: Result<RecordId, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
        let good: RecordId =
            serde_json::from_str("\"65f1c0ffee00000000000001\"").expect("valid id");
        assert_eq!(good.as_str(), "65f1c0ffee00000000000001");
    }
}
