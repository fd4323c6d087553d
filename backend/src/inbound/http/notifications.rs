//! Notifications collection handlers.

use actix_web::{HttpResponse, delete, get, post, put, web};
use envelope::{AckEnvelope, EnvelopeFields, ListEnvelope, RecordEnvelope, Toast};
use tracing::{debug, info};

use super::error::notification_persistence_failure;
use super::parse_id;
use super::state::HttpState;
use crate::domain::{Error, NewNotification, NotificationChanges};
use crate::inbound::http::ApiResult;

/// Envelope field names for the notifications resource.
pub const NOTIFICATIONS: EnvelopeFields = EnvelopeFields::new("notifications", "notification");

const NOT_FOUND: &str = "Notification not found";

/// List notifications, newest first.
#[get("/notifications")]
pub async fn list_notifications(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let notifications = state
        .notifications
        .list_newest_first()
        .await
        .map_err(|err| notification_persistence_failure("Failed to fetch notifications", err))?;
    debug!(count = notifications.len(), "listed notifications");
    Ok(HttpResponse::Ok().json(ListEnvelope::new(notifications).to_value(NOTIFICATIONS)?))
}

/// Record a notification, stamping it now when no timestamp is given.
#[post("/notifications")]
pub async fn create_notification(
    state: web::Data<HttpState>,
    payload: web::Json<NewNotification>,
) -> ApiResult<HttpResponse> {
    let record = payload.into_inner().into_record(state.clock.utc())?;
    let record = state
        .notifications
        .insert(record)
        .await
        .map_err(|err| notification_persistence_failure("Failed to add notification", err))?;
    info!(notification_id = %record.id, "notification created");
    let toast = Toast::success("Notification added successfully");
    Ok(HttpResponse::Ok().json(
        RecordEnvelope::new(record)
            .with_toast(toast)
            .to_value(NOTIFICATIONS)?,
    ))
}

/// Apply changes such as `read` to one notification.
#[put("/notifications/{id}")]
pub async fn update_notification(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<NotificationChanges>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path, "notification")?;
    let record = state
        .notifications
        .update(&id, payload.into_inner())
        .await
        .map_err(|err| notification_persistence_failure("Failed to update notification", err))?
        .ok_or_else(|| Error::not_found(NOT_FOUND))?;
    let toast = Toast::success("Notification updated successfully");
    Ok(HttpResponse::Ok().json(
        RecordEnvelope::new(record)
            .with_toast(toast)
            .to_value(NOTIFICATIONS)?,
    ))
}

/// Remove one notification.
#[delete("/notifications/{id}")]
pub async fn delete_notification(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path, "notification")?;
    state
        .notifications
        .delete(&id)
        .await
        .map_err(|err| notification_persistence_failure("Failed to delete notification", err))?
        .ok_or_else(|| Error::not_found(NOT_FOUND))?;
    Ok(HttpResponse::Ok().json(AckEnvelope::new(
        "Notification deleted",
        Toast::success("Notification deleted successfully"),
    )))
}

/// Remove every notification.
#[delete("/notifications")]
pub async fn clear_notifications(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let removed = state
        .notifications
        .clear()
        .await
        .map_err(|err| notification_persistence_failure("Failed to clear notifications", err))?;
    info!(removed, "notifications cleared");
    Ok(HttpResponse::Ok().json(AckEnvelope::new(
        "All notifications cleared",
        Toast::success(format!("{removed} notifications cleared successfully")),
    )))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::{MockNotificationRepository, NotificationPersistenceError};
    use crate::inbound::http::configure_api;
    use crate::inbound::http::state::HttpStatePorts;
    use crate::outbound::memory::{MemoryNotificationRepository, MemoryUserRepository};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use chrono::{DateTime, Local, TimeZone, Utc};
    use mockable::Clock;
    use serde_json::{Value, json};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("valid instant")
    }

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn state_with(
        notifications: Arc<dyn crate::domain::ports::NotificationRepository>,
    ) -> HttpState {
        HttpState::new(HttpStatePorts {
            users: Arc::new(MemoryUserRepository::default()),
            notifications,
            clock: Arc::new(FixedClock(noon())),
        })
    }

    fn fresh() -> HttpState {
        state_with(Arc::new(MemoryNotificationRepository::default()))
    }

    async fn call(state: &HttpState, req: actix_test::TestRequest) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure_api),
        )
        .await;
        let res = actix_test::call_service(&app, req.to_request()).await;
        let status = res.status();
        let body = actix_test::read_body(res).await;
        (status, serde_json::from_slice(&body).expect("JSON body"))
    }

    async fn post(state: &HttpState, body: Value) -> Value {
        let (status, body) = call(
            state,
            actix_test::TestRequest::post()
                .uri("/api/notifications")
                .set_json(body),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[actix_web::test]
    async fn create_stamps_missing_timestamp() {
        let state = fresh();

        let body = post(&state, json!({ "type": "add", "message": "User \"Ada\" added successfully" })).await;

        assert_eq!(body["notification"]["timestamp"], "2024-05-01T12:00:00Z");
        assert_eq!(body["notification"]["read"], false);
        assert_eq!(body["toast"]["message"], "Notification added successfully");
    }

    #[actix_web::test]
    async fn list_is_newest_first() {
        let state = fresh();
        post(&state, json!({ "type": "add", "message": "older", "timestamp": "2024-05-01T09:00:00Z" })).await;
        post(&state, json!({ "type": "delete", "message": "newer", "timestamp": "2024-05-01T10:00:00Z" })).await;

        let (_, body) = call(&state, actix_test::TestRequest::get().uri("/api/notifications")).await;

        assert_eq!(body["total"], 2);
        assert_eq!(body["notifications"][0]["message"], "newer");
        assert_eq!(body["notifications"][1]["message"], "older");
    }

    #[actix_web::test]
    async fn update_marks_read() {
        let state = fresh();
        let created = post(&state, json!({ "type": "update", "message": "edited" })).await;
        let id = created["notification"]["_id"].as_str().expect("id").to_owned();

        let (status, body) = call(
            &state,
            actix_test::TestRequest::put()
                .uri(&format!("/api/notifications/{id}"))
                .set_json(json!({ "read": true })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notification"]["read"], true);
        assert_eq!(body["toast"]["message"], "Notification updated successfully");
    }

    #[actix_web::test]
    async fn delete_unknown_is_not_found() {
        let (status, body) = call(
            &fresh(),
            actix_test::TestRequest::delete().uri("/api/notifications/65f1c0ffee00000000000fff"),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Notification not found");
    }

    #[actix_web::test]
    async fn delete_acknowledges() {
        let state = fresh();
        let created = post(&state, json!({ "type": "add", "message": "bye" })).await;
        let id = created["notification"]["_id"].as_str().expect("id").to_owned();

        let (status, body) = call(
            &state,
            actix_test::TestRequest::delete().uri(&format!("/api/notifications/{id}")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Notification deleted");
        assert_eq!(body["toast"]["message"], "Notification deleted successfully");
    }

    #[actix_web::test]
    async fn clear_reports_count_in_toast() {
        let state = fresh();
        post(&state, json!({ "type": "add", "message": "one" })).await;
        post(&state, json!({ "type": "add", "message": "two" })).await;

        let (status, body) = call(&state, actix_test::TestRequest::delete().uri("/api/notifications")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "All notifications cleared");
        assert_eq!(body["toast"]["message"], "2 notifications cleared successfully");
    }

    #[actix_web::test]
    async fn clear_outage_is_service_unavailable() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_clear()
            .times(1)
            .returning(|| Err(NotificationPersistenceError::query("locked")));

        let (status, body) = call(
            &state_with(Arc::new(repo)),
            actix_test::TestRequest::delete().uri("/api/notifications"),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Failed to clear notifications");
    }
}
