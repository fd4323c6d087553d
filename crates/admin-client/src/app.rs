//! Application-state container.
//!
//! [`AppState`] is built once at startup and handed to whatever drives the
//! client. The user store receives the notification store here, so no store
//! reaches for another through a global.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use reqwest::Url;
use tracing::{debug, info};

use crate::auth::AuthStore;
use crate::config::ClientSettings;
use crate::dashboard::DashboardStats;
use crate::persist::{AUTH_STORAGE_FILE, PersistedState, USERS_STORAGE_FILE};
use crate::ports::{CartSource, NotificationResource, UserResource};
use crate::rest::{CartsFeed, HttpTransport, NotificationsApi, UsersApi};
use crate::store::{NotificationStore, UserStore};
use crate::{CartLineItem, ClientError};

/// Parameter object bundling the driven ports the stores talk through.
#[derive(Clone)]
pub struct AppPorts {
    /// Users collection.
    pub users: Arc<dyn UserResource>,
    /// Notifications collection; `None` keeps notifications local.
    pub notifications: Option<Arc<dyn NotificationResource>>,
    /// Carts feed.
    pub carts: Arc<dyn CartSource>,
    /// Time source for notification timestamps.
    pub clock: Arc<dyn Clock + Send + Sync>,
}

/// Stores and sources shared by every command.
#[derive(Clone)]
pub struct AppState {
    /// User list and delete flow.
    pub users: UserStore,
    /// Notification feed.
    pub notifications: NotificationStore,
    /// Operator session.
    pub auth: AuthStore,
    /// Carts feed.
    pub carts: Arc<dyn CartSource>,
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ClientError> {
    Url::parse(raw).map_err(|err| ClientError::invalid_config(format!("{field} `{raw}`: {err}")))
}

impl AppState {
    /// Wire the HTTP adapters described by `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] for unusable URLs or settings and
    /// [`ClientError::Persistence`] when a stored session is unreadable.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ClientError> {
        let timeout = settings.request_timeout();
        let transport = Arc::new(HttpTransport::new(
            parse_url("api_base", settings.api_base())?,
            timeout,
        )?);
        let carts = CartsFeed::new(parse_url("carts_url", settings.carts_url())?, timeout)?;
        let notifications: Option<Arc<dyn NotificationResource>> = if settings.persist_notifications
        {
            Some(Arc::new(NotificationsApi::new(Arc::clone(&transport))))
        } else {
            None
        };
        info!(api_base = %transport.base(), "client wired");
        Self::from_ports(
            AppPorts {
                users: Arc::new(UsersApi::new(transport)),
                notifications,
                carts: Arc::new(carts),
                clock: Arc::new(DefaultClock),
            },
            settings,
        )
    }

    /// Build the stores over `ports`, persisting client state under the
    /// configured state directory.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] for an unknown undo policy and
    /// [`ClientError::Persistence`] when a stored session is unreadable.
    pub fn from_ports(ports: AppPorts, settings: &ClientSettings) -> Result<Self, ClientError> {
        let AppPorts {
            users,
            notifications,
            carts,
            clock,
        } = ports;
        let notification_settings = settings.notification_settings();
        let notifications = match notifications {
            Some(resource) => NotificationStore::persisted(resource, clock, notification_settings),
            None => NotificationStore::local(clock, notification_settings),
        };

        let state_dir = settings.state_dir();
        let users = UserStore::builder(users, notifications.clone())
            .settings(settings.delete_flow_settings()?)
            .snapshot(PersistedState::new(state_dir.clone(), USERS_STORAGE_FILE))
            .build();
        let auth = AuthStore::persisted(PersistedState::new(state_dir, AUTH_STORAGE_FILE))?;
        debug!(persisted = notifications.is_persisted(), "stores ready");

        Ok(Self {
            users,
            notifications,
            auth,
            carts,
        })
    }

    /// Flattened cart rows from the feed.
    ///
    /// # Errors
    ///
    /// Propagates the feed failure.
    pub async fn cart_items(&self) -> Result<Vec<CartLineItem>, ClientError> {
        self.carts.fetch_items().await
    }

    /// Overview figures for the current carts and users.
    ///
    /// # Errors
    ///
    /// Propagates the feed failure.
    pub async fn dashboard(&self) -> Result<DashboardStats, ClientError> {
        let items = self.cart_items().await?;
        Ok(DashboardStats::compute(&items, &self.users.users()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixtureCartSource, MockCartSource};
    use crate::test_support::{InMemoryNotifications, InMemoryUsers, MutableClock};
    use chrono::Utc;
    use rstest::rstest;

    fn settings_in(dir: &std::path::Path) -> ClientSettings {
        ClientSettings {
            state_dir: Some(dir.to_path_buf()),
            ..ClientSettings::default()
        }
    }

    fn ports(carts: Arc<dyn CartSource>, mirrored: bool) -> AppPorts {
        let notifications: Option<Arc<dyn NotificationResource>> = if mirrored {
            Some(Arc::new(InMemoryNotifications::default()))
        } else {
            None
        };
        AppPorts {
            users: Arc::new(InMemoryUsers::default()),
            notifications,
            carts,
            clock: Arc::new(MutableClock::new(Utc::now())),
        }
    }

    #[rstest]
    #[case::local(false)]
    #[case::mirrored(true)]
    fn notification_mode_follows_ports(#[case] mirrored: bool) {
        let root = tempfile::tempdir().expect("temp dir");

        let app = AppState::from_ports(
            ports(Arc::new(FixtureCartSource), mirrored),
            &settings_in(root.path()),
        )
        .expect("state builds");

        assert_eq!(app.notifications.is_persisted(), mirrored);
        assert!(!app.auth.is_authenticated());
    }

    #[rstest]
    fn unknown_undo_policy_fails_wiring() {
        let root = tempfile::tempdir().expect("temp dir");
        let settings = ClientSettings {
            undo_policy: Some("sometimes".to_owned()),
            ..settings_in(root.path())
        };

        let result = AppState::from_ports(ports(Arc::new(FixtureCartSource), false), &settings);

        assert!(matches!(result, Err(ClientError::InvalidConfig { .. })));
    }

    #[rstest]
    fn malformed_api_base_is_invalid_config() {
        let settings = ClientSettings {
            api_base: Some("not a url".to_owned()),
            ..ClientSettings::default()
        };

        let result = AppState::from_settings(&settings);

        assert!(matches!(result, Err(ClientError::InvalidConfig { .. })));
    }

    #[rstest]
    #[tokio::test]
    async fn dashboard_reads_the_cart_feed_once() {
        let root = tempfile::tempdir().expect("temp dir");
        let mut carts = MockCartSource::new();
        carts.expect_fetch_items().times(1).returning(|| Ok(Vec::new()));
        let app = AppState::from_ports(ports(Arc::new(carts), false), &settings_in(root.path()))
            .expect("state builds");

        let stats = app.dashboard().await.expect("stats");

        assert_eq!(stats.total_items, 0);
        assert_eq!(stats.total_users, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn feed_failure_propagates() {
        let root = tempfile::tempdir().expect("temp dir");
        let mut carts = MockCartSource::new();
        carts
            .expect_fetch_items()
            .returning(|| Err(ClientError::request_failed(503, "feed down")));
        let app = AppState::from_ports(ports(Arc::new(carts), false), &settings_in(root.path()))
            .expect("state builds");

        let error = app.cart_items().await.expect_err("feed down");

        assert_eq!(error.status(), Some(503));
    }
}
