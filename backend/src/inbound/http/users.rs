//! Users collection handlers.
//!
//! Successful mutations carry a success toast naming the user, e.g.
//! `User "Ada" added successfully`.

use actix_web::{HttpResponse, delete, get, post, put, web};
use envelope::{AckEnvelope, EnvelopeFields, ListEnvelope, RecordEnvelope, Toast};
use tracing::{debug, info};

use super::error::user_persistence_failure;
use super::parse_id;
use super::state::HttpState;
use crate::domain::{Error, NewUser, UserChanges};
use crate::inbound::http::ApiResult;

/// Envelope field names for the users resource.
pub const USERS: EnvelopeFields = EnvelopeFields::new("users", "user");

const NOT_FOUND: &str = "User not found";

/// List every user in insertion order.
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let users = state
        .users
        .list()
        .await
        .map_err(|err| user_persistence_failure("Failed to fetch users", err))?;
    debug!(count = users.len(), "listed users");
    Ok(HttpResponse::Ok().json(ListEnvelope::new(users).to_value(USERS)?))
}

/// Create a user, honouring a client-supplied `_id` when it is free.
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<NewUser>,
) -> ApiResult<HttpResponse> {
    let new_user = payload.into_inner();
    new_user.document.validate()?;
    let record = state
        .users
        .insert(new_user.into_record())
        .await
        .map_err(|err| user_persistence_failure("Failed to add user", err))?;
    info!(user_id = %record.id, "user created");
    let toast = Toast::success(format!("User \"{}\" added successfully", record.name()));
    Ok(HttpResponse::Ok().json(RecordEnvelope::new(record).with_toast(toast).to_value(USERS)?))
}

/// Merge the supplied fields into a user and return the full record.
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UserChanges>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path, "user")?;
    let changes = payload.into_inner();
    changes.validate()?;
    let record = state
        .users
        .update(&id, changes)
        .await
        .map_err(|err| user_persistence_failure("Failed to update user", err))?
        .ok_or_else(|| Error::not_found(NOT_FOUND))?;
    info!(user_id = %record.id, "user updated");
    let toast = Toast::success(format!("User \"{}\" updated successfully", record.name()));
    Ok(HttpResponse::Ok().json(RecordEnvelope::new(record).with_toast(toast).to_value(USERS)?))
}

/// Remove a user.
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_id(&path, "user")?;
    let removed = state
        .users
        .delete(&id)
        .await
        .map_err(|err| user_persistence_failure("Failed to delete user", err))?
        .ok_or_else(|| Error::not_found(NOT_FOUND))?;
    info!(user_id = %removed.id, "user deleted");
    let toast = Toast::success(format!("User \"{}\" deleted successfully", removed.name()));
    Ok(HttpResponse::Ok().json(AckEnvelope::new("User deleted", toast)))
}
