//! Client configuration loaded via OrthoConfig.
//!
//! Every field is optional; accessors fall back to the defaults below. Values
//! come from `ADMIN_CLIENT_*` environment variables or a configuration file.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::ClientError;
use crate::store::{
    DEFAULT_NOTIFICATION_CAP, DEFAULT_POPUP_HIDE, DeleteFlowSettings, NotificationSettings,
    UndoPolicy,
};

const DEFAULT_API_BASE: &str = "http://localhost:5000/api";
const DEFAULT_CARTS_URL: &str = "https://dummyjson.com/carts?limit=0";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_COUNTDOWN_TICKS: u32 = 5;
const DEFAULT_TICK_MS: u64 = 1_000;
const DEFAULT_STATE_DIR: &str = ".admin-client";

/// Settings for the REST adapters, stores, and persisted state.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ADMIN_CLIENT")]
pub struct ClientSettings {
    /// Base URL of the admin backend API.
    pub api_base: Option<String>,
    /// Upstream carts feed.
    pub carts_url: Option<String>,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: Option<u64>,
    /// Notifications kept; `0` keeps all of them.
    pub notification_cap: Option<usize>,
    /// Popup lifetime in milliseconds.
    pub popup_hide_ms: Option<u64>,
    /// Ticks in the delete confirmation and undo windows.
    pub countdown_ticks: Option<u32>,
    /// Length of one countdown tick in milliseconds.
    pub tick_ms: Option<u64>,
    /// Mirror notifications to the backend instead of keeping them local.
    #[ortho_config(default = false)]
    #[serde(default)]
    pub persist_notifications: bool,
    /// `recreate` or `local_only`.
    pub undo_policy: Option<String>,
    /// Directory holding the session and user-list snapshots.
    pub state_dir: Option<PathBuf>,
}

impl ClientSettings {
    /// Load from the environment and configuration files, ignoring the
    /// process arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] when a value cannot be parsed.
    pub fn load_from_env() -> Result<Self, ClientError> {
        Self::load_from_iter([OsString::from("admin-client")])
            .map_err(|err| ClientError::invalid_config(err.to_string()))
    }

    /// Backend API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    /// Carts feed URL.
    #[must_use]
    pub fn carts_url(&self) -> &str {
        self.carts_url.as_deref().unwrap_or(DEFAULT_CARTS_URL)
    }

    /// Per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS))
    }

    /// Notification retention and popup lifetime.
    #[must_use]
    pub fn notification_settings(&self) -> NotificationSettings {
        let cap = match self.notification_cap {
            Some(0) => None,
            Some(cap) => Some(cap),
            None => Some(DEFAULT_NOTIFICATION_CAP),
        };
        let popup_hide = self
            .popup_hide_ms
            .map_or(DEFAULT_POPUP_HIDE, Duration::from_millis);
        NotificationSettings { cap, popup_hide }
    }

    /// Configured undo policy.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] for an unknown policy name.
    pub fn undo_policy(&self) -> Result<UndoPolicy, ClientError> {
        self.undo_policy
            .as_deref()
            .map_or(Ok(UndoPolicy::default()), str::parse)
    }

    /// Delete flow timing and undo behaviour. A countdown of zero ticks is
    /// raised to one.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] for an unknown undo policy.
    pub fn delete_flow_settings(&self) -> Result<DeleteFlowSettings, ClientError> {
        Ok(DeleteFlowSettings {
            countdown_ticks: self
                .countdown_ticks
                .unwrap_or(DEFAULT_COUNTDOWN_TICKS)
                .max(1),
            tick: Duration::from_millis(self.tick_ms.unwrap_or(DEFAULT_TICK_MS)),
            undo_policy: self.undo_policy()?,
        })
    }

    /// Directory for persisted client state.
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
    }
}
