//! Behavioural tests for the confirm/undo delete flow.
//!
//! Scenarios run on a current-thread runtime with a paused clock, so every
//! countdown advances deterministically when a step lets time pass.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use admin_client::ports::UserResource;
use admin_client::store::{DeleteFlowSettings, NotificationSettings, UndoPolicy};
use admin_client::test_support::{InMemoryUsers, MutableClock};
use admin_client::{
    ClientError, DeleteOutcome, DeletePrompt, DeleteTicket, NotificationStore, User, UserFields,
    UserId, UserStore,
};
use chrono::{NaiveDate, Utc};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use tokio::runtime::{Builder, Runtime};

/// Slack past a tick boundary so the tick fires before the step returns.
const SETTLE: Duration = Duration::from_millis(100);

#[derive(Clone)]
struct RuntimeHandle(Arc<Runtime>);

type SharedTicket = Arc<Mutex<Option<DeleteTicket>>>;

#[derive(Default, ScenarioState)]
struct DeleteWorld {
    runtime: Slot<RuntimeHandle>,
    server: Slot<Arc<InMemoryUsers>>,
    store: Slot<UserStore>,
    notifications: Slot<NotificationStore>,
    ticket: Slot<SharedTicket>,
    rejected: Slot<ClientError>,
}

impl DeleteWorld {
    fn runtime(&self) -> Arc<Runtime> {
        self.runtime.get().expect("runtime should be set").0
    }

    fn store(&self) -> UserStore {
        self.store.get().expect("store should be set")
    }

    fn server(&self) -> Arc<InMemoryUsers> {
        self.server.get().expect("server should be set")
    }

    fn outcome(&self) -> DeleteOutcome {
        let shared = self.ticket.get().expect("a delete should have started");
        let ticket = shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .expect("ticket not yet consumed");
        self.runtime().block_on(ticket.outcome())
    }
}

#[fixture]
fn world() -> DeleteWorld {
    DeleteWorld::default()
}

fn user(id: &str, name: &str) -> User {
    User {
        id: Some(UserId::new(id)),
        fields: UserFields {
            name: name.to_owned(),
            email: format!("{}@example.com", name.to_lowercase()),
            gender: "female".to_owned(),
            department: "Engineering".to_owned(),
            phone: "5550100123".to_owned(),
            is_active: true,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
        },
    }
}

fn names(store: &UserStore) -> String {
    store
        .users()
        .iter()
        .map(|user| user.name().to_owned())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Given steps
// ============================================================================

#[given("a user store holding Ada, Barbara and Claude")]
fn a_user_store_holding_three_users(world: &DeleteWorld) {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .expect("create runtime");
    let server = Arc::new(InMemoryUsers::with_users(vec![
        user("a", "Ada"),
        user("b", "Barbara"),
        user("c", "Claude"),
    ]));
    let notifications = NotificationStore::local(
        Arc::new(MutableClock::new(Utc::now())),
        NotificationSettings::default(),
    );
    let store = UserStore::builder(
        Arc::clone(&server) as Arc<dyn UserResource>,
        notifications.clone(),
    )
    .settings(DeleteFlowSettings {
        countdown_ticks: 5,
        tick: Duration::from_secs(1),
        undo_policy: UndoPolicy::Recreate,
    })
    .build();
    runtime.block_on(store.load()).expect("initial load");

    world.runtime.set(RuntimeHandle(Arc::new(runtime)));
    world.server.set(server);
    world.store.set(store);
    world.notifications.set(notifications);
}

#[given("the server rejects the next delete")]
fn the_server_rejects_the_next_delete(world: &DeleteWorld) {
    world
        .server()
        .fail_next("delete", ClientError::request_failed(500, "database offline"));
}

// ============================================================================
// When steps
// ============================================================================

#[when("I delete user {id}")]
fn i_delete_user(world: &DeleteWorld, id: String) {
    let store = world.store();
    let started = world
        .runtime()
        .block_on(async { store.delete(&UserId::new(id)) });
    match started {
        Ok(ticket) => world.ticket.set(Arc::new(Mutex::new(Some(ticket)))),
        Err(error) => world.rejected.set(error),
    }
}

#[when("I confirm the delete")]
fn i_confirm_the_delete(world: &DeleteWorld) {
    let store = world.store();
    // A rejected delete is reported through the ticket.
    drop(world.runtime().block_on(store.confirm_delete()));
}

#[when("I undo the delete")]
fn i_undo_the_delete(world: &DeleteWorld) {
    let store = world.store();
    world
        .runtime()
        .block_on(store.undo_delete())
        .expect("undo succeeds");
}

#[when("{seconds:u64} seconds pass")]
fn seconds_pass(world: &DeleteWorld, seconds: u64) {
    // The sleep must be created inside the runtime so it binds to its timer.
    world.runtime().block_on(async {
        tokio::time::sleep(Duration::from_secs(seconds) + SETTLE).await;
    });
}

// ============================================================================
// Then steps
// ============================================================================

#[then("the delete flow ends as {outcome}")]
fn the_delete_flow_ends_as(world: &DeleteWorld, outcome: String) {
    let finished = world.outcome();
    let label = match finished {
        DeleteOutcome::Expired => "expired",
        DeleteOutcome::Deleted => "deleted",
        DeleteOutcome::Restored => "restored",
        DeleteOutcome::Failed(_) => "failed",
        DeleteOutcome::Abandoned => "abandoned",
    };
    assert_eq!(label, outcome, "unexpected outcome {finished:?}");
}

#[then("the server received no delete request")]
fn the_server_received_no_delete_request(world: &DeleteWorld) {
    let calls = world.server().calls();
    assert!(
        calls.iter().all(|call| !call.starts_with("DELETE")),
        "unexpected delete in {calls:?}"
    );
}

#[then("the user list is {expected}")]
fn the_user_list_is(world: &DeleteWorld, expected: String) {
    assert_eq!(names(&world.store()), expected);
}

#[then("the server holds user {id}")]
fn the_server_holds_user(world: &DeleteWorld, id: String) {
    let id = UserId::new(id);
    assert!(
        world
            .server()
            .server_users()
            .iter()
            .any(|user| user.has_id(&id))
    );
}

#[then("the prompt offers undo with {ticks:u32} ticks left")]
fn the_prompt_offers_undo(world: &DeleteWorld, ticks: u32) {
    match world.store().prompt() {
        DeletePrompt::Undo { remaining, .. } => assert_eq!(remaining, ticks),
        other => panic!("expected undo prompt, got {other:?}"),
    }
}

#[then("the prompt asks to confirm {label}")]
fn the_prompt_asks_to_confirm(world: &DeleteWorld, label: String) {
    match world.store().prompt() {
        DeletePrompt::Confirm { label: shown, .. } => assert_eq!(shown, label),
        other => panic!("expected confirm prompt, got {other:?}"),
    }
}

#[then("the second delete is refused as busy")]
fn the_second_delete_is_refused_as_busy(world: &DeleteWorld) {
    assert_eq!(world.rejected.get(), Some(ClientError::DeleteFlowBusy));
}

#[then("the latest notification reads {message}")]
fn the_latest_notification_reads(world: &DeleteWorld, message: String) {
    let latest = world
        .notifications
        .get()
        .expect("notifications should be set")
        .latest()
        .expect("a notification was recorded");
    assert_eq!(latest.message, message);
}

// ============================================================================
// Scenarios
// ============================================================================

#[scenario(
    path = "tests/features/delete_undo.feature",
    name = "An unconfirmed delete lapses without touching the server"
)]
fn unconfirmed_delete_lapses(world: DeleteWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/delete_undo.feature",
    name = "A confirmed delete becomes final once the undo window closes"
)]
fn confirmed_delete_becomes_final(world: DeleteWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/delete_undo.feature",
    name = "Undo restores the user at its former position"
)]
fn undo_restores_user(world: DeleteWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/delete_undo.feature",
    name = "A second delete is refused while one awaits confirmation"
)]
fn second_delete_is_refused(world: DeleteWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/delete_undo.feature",
    name = "A failed delete keeps the user"
)]
fn failed_delete_keeps_user(world: DeleteWorld) {
    let _ = world;
}
