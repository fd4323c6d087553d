//! Encoding and decoding of the four envelope shapes.
//!
//! List and record envelopes carry their payload under a field whose name
//! depends on the resource, so they are mapped through [`serde_json::Map`]
//! instead of derived serde impls. Ack and error envelopes have fixed shapes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{EnvelopeError, TOAST_FIELD, TOTAL_FIELD, Toast};

/// Resource-specific field names used by list and record envelopes.
///
/// # Examples
/// ```
/// use envelope::EnvelopeFields;
///
/// const USERS: EnvelopeFields = EnvelopeFields::new("users", "user");
/// assert_eq!(USERS.collection, "users");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeFields {
    /// Field holding the record array of a list response.
    pub collection: &'static str,
    /// Field holding the single record of a create or update response.
    pub record: &'static str,
}

impl EnvelopeFields {
    /// Name the collection and record fields for one resource.
    #[must_use]
    pub const fn new(collection: &'static str, record: &'static str) -> Self {
        Self { collection, record }
    }
}

/// A listed collection plus its count.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEnvelope<T> {
    /// Records in server order.
    pub items: Vec<T>,
    /// Server-reported count; defaults to `items.len()` when absent.
    pub total: usize,
    /// Optional advisory message.
    pub toast: Option<Toast>,
}

impl<T> ListEnvelope<T> {
    /// Wrap `items`, deriving `total` from their length.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        let total = items.len();
        Self {
            items,
            total,
            toast: None,
        }
    }

    /// Attach an advisory toast.
    #[must_use]
    pub fn with_toast(mut self, toast: Toast) -> Self {
        self.toast = Some(toast);
        self
    }
}

impl<T: Serialize> ListEnvelope<T> {
    /// Encode as `{ "<collection>": [..], "total": n, "toast"?: .. }`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Json`] when a record fails to serialise.
    pub fn to_value(&self, fields: EnvelopeFields) -> Result<Value, EnvelopeError> {
        let items = serde_json::to_value(&self.items).map_err(|err| EnvelopeError::json(&err))?;
        let mut map = Map::new();
        map.insert(fields.collection.to_owned(), items);
        map.insert(TOTAL_FIELD.to_owned(), Value::from(self.total));
        insert_toast(&mut map, self.toast.as_ref())?;
        Ok(Value::Object(map))
    }
}

impl<T: DeserializeOwned> ListEnvelope<T> {
    /// Decode a list envelope from a parsed JSON value.
    ///
    /// # Errors
    ///
    /// Fails when the value is not an object, lacks the collection field, or
    /// the records do not match `T`.
    pub fn from_value(value: Value, fields: EnvelopeFields) -> Result<Self, EnvelopeError> {
        let mut map = into_object(value)?;
        let raw_items = map
            .remove(fields.collection)
            .ok_or(EnvelopeError::MissingField {
                field: fields.collection,
            })?;
        let items: Vec<T> =
            serde_json::from_value(raw_items).map_err(|err| EnvelopeError::json(&err))?;
        let total = map
            .get(TOTAL_FIELD)
            .and_then(Value::as_u64)
            .and_then(|total| usize::try_from(total).ok())
            .unwrap_or(items.len());
        Ok(Self {
            items,
            total,
            toast: take_toast(&mut map),
        })
    }

    /// Decode a list envelope from raw response bytes.
    ///
    /// # Errors
    ///
    /// Fails when the bytes are not JSON or [`Self::from_value`] fails.
    pub fn from_slice(body: &[u8], fields: EnvelopeFields) -> Result<Self, EnvelopeError> {
        Self::from_value(parse_body(body)?, fields)
    }
}

/// A single created or updated record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEnvelope<T> {
    /// The record as persisted by the server.
    pub record: T,
    /// Optional advisory message.
    pub toast: Option<Toast>,
}

impl<T> RecordEnvelope<T> {
    /// Wrap one record.
    #[must_use]
    pub const fn new(record: T) -> Self {
        Self {
            record,
            toast: None,
        }
    }

    /// Attach an advisory toast.
    #[must_use]
    pub fn with_toast(mut self, toast: Toast) -> Self {
        self.toast = Some(toast);
        self
    }
}

impl<T: Serialize> RecordEnvelope<T> {
    /// Encode as `{ "<record>": {..}, "toast"?: .. }`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Json`] when the record fails to serialise.
    pub fn to_value(&self, fields: EnvelopeFields) -> Result<Value, EnvelopeError> {
        let record = serde_json::to_value(&self.record).map_err(|err| EnvelopeError::json(&err))?;
        let mut map = Map::new();
        map.insert(fields.record.to_owned(), record);
        insert_toast(&mut map, self.toast.as_ref())?;
        Ok(Value::Object(map))
    }
}

impl<T: DeserializeOwned> RecordEnvelope<T> {
    /// Decode a record envelope from a parsed JSON value.
    ///
    /// # Errors
    ///
    /// Fails when the value is not an object, lacks the record field, or the
    /// record does not match `T`.
    pub fn from_value(value: Value, fields: EnvelopeFields) -> Result<Self, EnvelopeError> {
        let mut map = into_object(value)?;
        let raw_record = map.remove(fields.record).ok_or(EnvelopeError::MissingField {
            field: fields.record,
        })?;
        let record = serde_json::from_value(raw_record).map_err(|err| EnvelopeError::json(&err))?;
        Ok(Self {
            record,
            toast: take_toast(&mut map),
        })
    }

    /// Decode a record envelope from raw response bytes.
    ///
    /// # Errors
    ///
    /// Fails when the bytes are not JSON or [`Self::from_value`] fails.
    pub fn from_slice(body: &[u8], fields: EnvelopeFields) -> Result<Self, EnvelopeError> {
        Self::from_value(parse_body(body)?, fields)
    }
}

/// Acknowledgement of a mutation that returns no record (deletes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckEnvelope {
    /// Short status text.
    #[serde(default)]
    pub message: String,
    /// Optional advisory message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toast: Option<Toast>,
}

impl AckEnvelope {
    /// Build an acknowledgement with an advisory toast.
    pub fn new(message: impl Into<String>, toast: Toast) -> Self {
        Self {
            message: message.into(),
            toast: Some(toast),
        }
    }

    /// Decode an acknowledgement, tolerating an empty body.
    ///
    /// # Errors
    ///
    /// Fails when a non-empty body is not a JSON object.
    pub fn from_slice(body: &[u8]) -> Result<Self, EnvelopeError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self {
                message: String::new(),
                toast: None,
            });
        }
        let mut map = into_object(parse_body(body)?)?;
        let message = map
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        Ok(Self {
            message,
            toast: take_toast(&mut map),
        })
    }
}

/// Body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// Human-readable failure description.
    pub error: String,
    /// Stable machine-readable category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Request trace identifier, when the server tracked one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Optional advisory message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toast: Option<Toast>,
}

impl ErrorEnvelope {
    /// Build an error body whose toast repeats the error text.
    pub fn new(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            toast: Some(Toast::error(error.clone())),
            error,
            code: None,
            trace_id: None,
        }
    }

    /// Attach a machine-readable category.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach a trace identifier.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }
}

fn parse_body(body: &[u8]) -> Result<Value, EnvelopeError> {
    serde_json::from_slice(body).map_err(|err| EnvelopeError::json(&err))
}

fn into_object(value: Value) -> Result<Map<String, Value>, EnvelopeError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(EnvelopeError::NotAnObject),
    }
}

fn insert_toast(map: &mut Map<String, Value>, toast: Option<&Toast>) -> Result<(), EnvelopeError> {
    if let Some(toast) = toast {
        let encoded = serde_json::to_value(toast).map_err(|err| EnvelopeError::json(&err))?;
        map.insert(TOAST_FIELD.to_owned(), encoded);
    }
    Ok(())
}

// Advisory only: a malformed toast is dropped rather than failing the decode.
fn take_toast(map: &mut Map<String, Value>) -> Option<Toast> {
    map.remove(TOAST_FIELD)
        .and_then(|raw| serde_json::from_value(raw).ok())
}
