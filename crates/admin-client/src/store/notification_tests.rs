//! Tests for notification ordering, retention, popup timing, and mirroring.

use super::*;
use crate::ports::{MockNotificationResource, Reply};
use crate::test_support::{InMemoryNotifications, MutableClock};
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> Arc<MutableClock> {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).single().unwrap_or_default();
    Arc::new(MutableClock::new(start))
}

fn local_store(clock: Arc<MutableClock>, cap: Option<usize>) -> NotificationStore {
    NotificationStore::local(
        clock,
        NotificationSettings {
            cap,
            popup_hide: Duration::from_secs(4),
        },
    )
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn append_prepends_and_caps_at_ten(clock: Arc<MutableClock>) {
    let store = local_store(Arc::clone(&clock), Some(10));

    for index in 0..12 {
        store
            .append(NotificationKind::Add, format!("User \"u{index}\" added successfully"))
            .await
            .expect("local append succeeds");
        clock.advance(Duration::from_secs(1));
    }

    let notifications = store.notifications();
    assert_eq!(notifications.len(), 10);
    assert_eq!(
        notifications.first().map(|n| n.message.as_str()),
        Some("User \"u11\" added successfully")
    );
    assert_eq!(
        notifications.last().map(|n| n.message.as_str()),
        Some("User \"u2\" added successfully")
    );
    assert!(
        notifications
            .windows(2)
            .all(|pair| matches!(pair, [newer, older] if newer.timestamp > older.timestamp))
    );
    assert_eq!(store.unread_count(), 10);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn unbounded_store_keeps_everything(clock: Arc<MutableClock>) {
    let store = local_store(clock, None);
    for _ in 0..15 {
        store
            .append(NotificationKind::Update, "User \"Ada\" updated successfully")
            .await
            .expect("local append succeeds");
    }
    assert_eq!(store.notifications().len(), 15);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn popup_hides_four_seconds_after_latest_append(clock: Arc<MutableClock>) {
    let store = local_store(clock, Some(10));

    store
        .append(NotificationKind::Add, "first")
        .await
        .expect("append");
    tokio::time::sleep(Duration::from_secs(3)).await;
    store
        .append(NotificationKind::Add, "second")
        .await
        .expect("append");

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(
        store.is_popup_visible(),
        "the first timer must not hide the second popup"
    );

    tokio::time::sleep(Duration::from_millis(2_100)).await;
    assert!(!store.is_popup_visible());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn dismiss_popup_hides_immediately(clock: Arc<MutableClock>) {
    let store = local_store(clock, Some(10));
    store
        .append(NotificationKind::Delete, "gone")
        .await
        .expect("append");

    store.dismiss_popup();

    assert!(!store.is_popup_visible());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn read_and_remove_in_local_mode(clock: Arc<MutableClock>) {
    let store = local_store(clock, Some(10));
    let first = store
        .append(NotificationKind::Add, "one")
        .await
        .expect("append");
    let second = store
        .append(NotificationKind::Add, "two")
        .await
        .expect("append");

    store.mark_as_read(&first.id).await.expect("mark read");
    assert_eq!(store.unread_count(), 1);

    store.remove(&second.id).await.expect("remove");
    assert_eq!(store.notifications().len(), 1);
    assert_eq!(store.unread_count(), 0);

    store.clear().await.expect("clear");
    assert!(store.notifications().is_empty());
    assert!(!store.is_popup_visible());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn persisted_mode_adopts_server_ids(clock: Arc<MutableClock>) {
    let server = Arc::new(InMemoryNotifications::default());
    let store = NotificationStore::persisted(
        Arc::clone(&server) as Arc<dyn NotificationResource>,
        clock,
        NotificationSettings::default(),
    );

    let stored = store
        .append(NotificationKind::Add, "User \"Ada\" added successfully")
        .await
        .expect("server accepts");
    store.mark_all_as_read().await.expect("mark all");

    assert_eq!(stored.id.as_str(), "n1");
    assert_eq!(
        server.calls(),
        vec!["POST /notifications", "PUT /notifications/n1"]
    );
    assert_eq!(store.unread_count(), 0);
    assert!(
        server
            .server_notifications()
            .iter()
            .all(|notification| notification.read)
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn persisted_failure_leaves_list_unchanged(clock: Arc<MutableClock>) {
    let server = Arc::new(InMemoryNotifications::default());
    server.fail_next("create", ClientError::request_failed(503, "unavailable"));
    let store = NotificationStore::persisted(
        Arc::clone(&server) as Arc<dyn NotificationResource>,
        clock,
        NotificationSettings::default(),
    );

    let error = store
        .append(NotificationKind::Add, "lost")
        .await
        .expect_err("server rejects");

    assert_eq!(error.status(), Some(503));
    assert!(store.notifications().is_empty());
    assert!(!store.is_popup_visible());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn load_sorts_newest_first(clock: Arc<MutableClock>) {
    let older = Notification {
        id: NotificationId::new("a"),
        kind: NotificationKind::Add,
        message: "older".to_owned(),
        timestamp: clock.utc(),
        read: true,
    };
    let newer = Notification {
        id: NotificationId::new("b"),
        timestamp: clock.utc() + chrono::TimeDelta::seconds(30),
        message: "newer".to_owned(),
        ..older.clone()
    };
    let mut mirror = MockNotificationResource::new();
    mirror
        .expect_list()
        .times(1)
        .return_once(move || Ok(Reply::bare(vec![older, newer])));
    let store = NotificationStore::persisted(Arc::new(mirror), clock, NotificationSettings::default());

    store.load().await.expect("load succeeds");

    let ids: Vec<String> = store
        .notifications()
        .into_iter()
        .map(|notification| notification.id.to_string())
        .collect();
    assert_eq!(ids, vec!["b", "a"]);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn marking_unknown_id_issues_no_request(clock: Arc<MutableClock>) {
    let mut mirror = MockNotificationResource::new();
    mirror.expect_update().never();
    let store = NotificationStore::persisted(Arc::new(mirror), clock, NotificationSettings::default());

    store
        .mark_as_read(&NotificationId::new("missing"))
        .await
        .expect("ignored");
}
