//! User records as exchanged with the users resource.
//!
//! The wire shape is a flat camelCase object whose server-assigned identifier
//! lives under `_id`. [`User`] splits that into an optional [`UserId`] and the
//! editable [`UserFields`], so the same fields type serves create forms and
//! persisted records.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ClientError;

/// Opaque server-assigned identifier.
///
/// # Examples
/// ```
/// use admin_client::UserId;
///
/// let id = UserId::new("65a1f0c2e4b0a1b2c3d4e5f6");
/// assert_eq!(id.as_str(), "65a1f0c2e4b0a1b2c3d4e5f6");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an identifier issued by the server.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Editable user attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFields {
    /// Display name; also used in notification text.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// Free-form gender selection.
    pub gender: String,
    /// Owning department.
    pub department: String,
    /// Contact number.
    pub phone: String,
    /// Whether the account counts towards active users.
    #[serde(default)]
    pub is_active: bool,
    /// Employment start date.
    #[serde(with = "iso_date")]
    pub start_date: NaiveDate,
}

/// Minimum accepted name length.
pub const NAME_MIN: usize = 2;
/// Minimum accepted phone length.
pub const PHONE_MIN: usize = 10;

#[expect(clippy::expect_used, reason = "the pattern is a valid literal")]
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

impl UserFields {
    /// Check the form rules applied before any create or update request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ValidationFailed`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), ClientError> {
        validate_name(&self.name)?;
        validate_email(&self.email)?;
        require("gender", &self.gender, "Please select a gender")?;
        require("department", &self.department, "Please select a department")?;
        validate_phone(&self.phone)
    }
}

fn require(field: &'static str, value: &str, message: &str) -> Result<(), ClientError> {
    if value.trim().is_empty() {
        return Err(ClientError::validation(field, message));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), ClientError> {
    require("name", name, "Name is required")?;
    if name.trim().chars().count() < NAME_MIN {
        return Err(ClientError::validation(
            "name",
            format!("Name must be at least {NAME_MIN} characters"),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ClientError> {
    require("email", email, "Email is required")?;
    if !EMAIL_RE.is_match(email.trim()) {
        return Err(ClientError::validation("email", "Invalid email address"));
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<(), ClientError> {
    require("phone", phone, "Phone number is required")?;
    if phone.trim().chars().count() < PHONE_MIN {
        return Err(ClientError::validation(
            "phone",
            format!("Phone number must be at least {PHONE_MIN} digits"),
        ));
    }
    Ok(())
}

/// A user as listed by the server, or an optimistic candidate awaiting an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Present once the server has persisted the record.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    /// Editable attributes.
    #[serde(flatten)]
    pub fields: UserFields,
}

impl User {
    /// Candidate for creation; the server assigns the id.
    #[must_use]
    pub const fn candidate(fields: UserFields) -> Self {
        Self { id: None, fields }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.fields.name.as_str()
    }

    /// Whether this record carries `id`.
    #[must_use]
    pub fn has_id(&self, id: &UserId) -> bool {
        self.id.as_ref() == Some(id)
    }
}

/// Partial update sent to `PUT /users/{id}`; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    /// Replacement name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Replacement gender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Replacement department.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Replacement phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Replacement activity flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Replacement start date.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "iso_date::option"
    )]
    pub start_date: Option<NaiveDate>,
}

impl UserPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.gender.is_none()
            && self.department.is_none()
            && self.phone.is_none()
            && self.is_active.is_none()
            && self.start_date.is_none()
    }

    /// Check the form rules for every field the patch replaces.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ValidationFailed`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), ClientError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(gender) = &self.gender {
            require("gender", gender, "Please select a gender")?;
        }
        if let Some(department) = &self.department {
            require("department", department, "Please select a department")?;
        }
        if let Some(phone) = &self.phone {
            validate_phone(phone)?;
        }
        Ok(())
    }

    /// Produce the fields that would result from applying this patch.
    #[must_use]
    pub fn apply_to(&self, fields: &UserFields) -> UserFields {
        UserFields {
            name: self.name.clone().unwrap_or_else(|| fields.name.clone()),
            email: self.email.clone().unwrap_or_else(|| fields.email.clone()),
            gender: self.gender.clone().unwrap_or_else(|| fields.gender.clone()),
            department: self
                .department
                .clone()
                .unwrap_or_else(|| fields.department.clone()),
            phone: self.phone.clone().unwrap_or_else(|| fields.phone.clone()),
            is_active: self.is_active.unwrap_or(fields.is_active),
            start_date: self.start_date.unwrap_or(fields.start_date),
        }
    }
}

/// `yyyy-MM-dd` dates that also accept full RFC 3339 timestamps on input.
mod iso_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub(super) fn parse(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, FORMAT).ok().or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|stamp| stamp.date_naive())
        })
    }

    pub(super) fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }

    pub(super) mod option {
        use chrono::NaiveDate;
        use serde::{Deserialize, Deserializer, Serializer};

        pub(in super::super) fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub(in super::super) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| {
                    super::parse(&raw)
                        .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
                })
                .transpose()
        }
    }
}

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;
