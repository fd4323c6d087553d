//! Domain primitives and ports.
//!
//! Records here are transport agnostic. Inbound adapters decode requests into
//! these types and outbound adapters store them.

pub mod error;
pub mod notification;
pub mod ports;
pub mod record_id;
pub mod trace_id;
pub mod user;

pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::notification::{
    NewNotification, NotificationChanges, NotificationDocument, NotificationKind,
    NotificationRecord,
};
pub use self::record_id::{RecordId, RecordIdError};
pub use self::trace_id::TraceId;
pub use self::user::{NewUser, UserChanges, UserDocument, UserRecord};
