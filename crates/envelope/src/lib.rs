//! Canonical response envelope shared by the admin backend and its clients.
//!
//! Every endpoint nests its payload under a resource-specific field rather
//! than returning it at the top level:
//!
//! ```text
//! list    { "<collection>": [..], "total": n, "toast"?: {..} }
//! record  { "<record>": {..}, "toast"?: {..} }
//! ack     { "message": "..", "toast"?: {..} }
//! error   { "error": "..", "code"?: "..", "traceId"?: "..", "toast"?: {..} }
//! ```
//!
//! The `toast` member is advisory. Decoders tolerate a missing or malformed
//! toast so callers never depend on it for correctness.

mod codec;
mod error;
mod toast;

pub use codec::{AckEnvelope, EnvelopeFields, ErrorEnvelope, ListEnvelope, RecordEnvelope};
pub use error::EnvelopeError;
pub use toast::{Toast, ToastKind};

/// Field holding the list length in list envelopes.
pub const TOTAL_FIELD: &str = "total";
/// Field holding the advisory toast in every envelope.
pub const TOAST_FIELD: &str = "toast";
