//! Client-side state: users, notifications, and the delete flow that ties
//! them together.

mod delete_flow;
mod notification;
mod user;

pub use delete_flow::{DeleteOutcome, DeletePrompt, DeleteTicket};
pub use notification::{
    DEFAULT_NOTIFICATION_CAP, DEFAULT_POPUP_HIDE, NotificationSettings, NotificationStore,
};
pub use user::{
    ConfirmOutcome, DEFAULT_UNDO_MESSAGE, DeleteFlowSettings, FALLBACK_LABEL, UndoOutcome,
    UndoPolicy, UserStore, UserStoreBuilder,
};
