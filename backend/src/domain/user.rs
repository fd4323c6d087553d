//! Users collection records.
//!
//! On the wire a user is a flat camelCase object with its identifier under
//! `_id`. Updates are partial: absent fields keep their stored values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Error, RecordId};

/// Stored user attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub name: String,
    pub email: String,
    pub gender: String,
    pub department: String,
    pub phone: String,
    #[serde(default)]
    pub is_active: bool,
    pub start_date: NaiveDate,
}

impl UserDocument {
    /// Reject documents the dashboard cannot display.
    ///
    /// # Errors
    ///
    /// Returns [`Error::invalid_request`] when the name or email is blank.
    pub fn validate(&self) -> Result<(), Error> {
        require("name", &self.name)?;
        require("email", &self.email)
    }
}

fn require(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::invalid_request(format!("{field} must not be blank")));
    }
    Ok(())
}

/// A persisted user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(flatten)]
    pub document: UserDocument,
}

impl UserRecord {
    /// Display name used in toasts.
    #[must_use]
    pub fn name(&self) -> &str {
        self.document.name.as_str()
    }
}

/// Body of `POST /users`.
///
/// A client may supply `_id` to re-create a record under its former
/// identifier; otherwise one is generated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    #[serde(rename = "_id", default)]
    pub id: Option<RecordId>,
    #[serde(flatten)]
    pub document: UserDocument,
}

impl NewUser {
    /// Assign the final identifier.
    #[must_use]
    pub fn into_record(self) -> UserRecord {
        UserRecord {
            id: self.id.unwrap_or_else(RecordId::generate),
            document: self.document,
        }
    }
}

/// Body of `PUT /users/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
    pub start_date: Option<NaiveDate>,
}

impl UserChanges {
    /// Overlay the supplied fields onto `document`.
    pub fn apply(self, document: &mut UserDocument) {
        let Self {
            name,
            email,
            gender,
            department,
            phone,
            is_active,
            start_date,
        } = self;
        if let Some(name) = name {
            document.name = name;
        }
        if let Some(email) = email {
            document.email = email;
        }
        if let Some(gender) = gender {
            document.gender = gender;
        }
        if let Some(department) = department {
            document.department = department;
        }
        if let Some(phone) = phone {
            document.phone = phone;
        }
        if let Some(is_active) = is_active {
            document.is_active = is_active;
        }
        if let Some(start_date) = start_date {
            document.start_date = start_date;
        }
    }

    /// Reject changes that would blank a required field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::invalid_request`] for a blank name or email.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(name) = &self.name {
            require("name", name)?;
        }
        if let Some(email) = &self.email {
            require("email", email)?;
        }
        Ok(())
    }
}
