//! HTTP inbound adapter exposing the `/api` collections.
//!
//! ```text
//! GET    /api/users                 DELETE /api/notifications/{id}
//! POST   /api/users                 DELETE /api/notifications
//! PUT    /api/users/{id}            GET    /api/notifications
//! DELETE /api/users/{id}            POST   /api/notifications
//!                                   PUT    /api/notifications/{id}
//! ```

pub mod error;
pub mod health;
pub mod notifications;
pub mod state;
pub mod users;

use actix_web::web;

pub use error::ApiResult;

use crate::domain::{Error, RecordId};

/// Mount prefix for the collections.
pub const API_PREFIX: &str = "/api";

/// Register the collection endpoints under [`API_PREFIX`].
///
/// Handlers expect a [`state::HttpState`] in application data.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use admin_backend::inbound::http::{configure_api, state::HttpState};
///
/// let _app = App::new()
///     .app_data(web::Data::new(HttpState::in_memory()))
///     .configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(API_PREFIX)
            .app_data(error::json_config())
            .service(users::list_users)
            .service(users::create_user)
            .service(users::update_user)
            .service(users::delete_user)
            .service(notifications::list_notifications)
            .service(notifications::create_notification)
            .service(notifications::update_notification)
            .service(notifications::delete_notification)
            .service(notifications::clear_notifications)
            .default_service(web::to(error::route_not_found)),
    );
}

fn parse_id(raw: &str, resource: &str) -> Result<RecordId, Error> {
    RecordId::parse(raw).map_err(|err| Error::invalid_request(format!("Invalid {resource} id: {err}")))
}
