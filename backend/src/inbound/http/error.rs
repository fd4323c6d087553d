//! HTTP adapter mapping for domain errors.
//!
//! Every non-2xx response carries the error envelope: the message, its code,
//! the request trace id, and an error toast repeating the message.

use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use envelope::{EnvelopeError, ErrorEnvelope};
use tracing::{error, warn};

use crate::domain::ports::{NotificationPersistenceError, UserPersistenceError};
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn envelope_for(error: &Error) -> ErrorEnvelope {
    let message = if matches!(error.code(), ErrorCode::InternalError) {
        REDACTED_MESSAGE
    } else {
        error.message()
    };
    let body = ErrorEnvelope::new(message).with_code(error.code().as_str());
    match error.trace_id() {
        Some(id) => body.with_trace_id(id),
        None => body,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(envelope_for(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(REDACTED_MESSAGE)
    }
}

impl From<EnvelopeError> for Error {
    fn from(err: EnvelopeError) -> Self {
        error!(error = %err, "response envelope could not be encoded");
        Error::internal(REDACTED_MESSAGE)
    }
}

/// Map a users repository failure, using `context` as the client message for
/// storage outages.
pub(crate) fn user_persistence_failure(context: &str, err: UserPersistenceError) -> Error {
    match err {
        UserPersistenceError::Duplicate { id } => {
            warn!(user_id = %id, "user id already taken");
            Error::conflict(format!("User {id} already exists"))
        }
        other @ (UserPersistenceError::Connection { .. } | UserPersistenceError::Query { .. }) => {
            error!(error = %other, kind = other.kind(), context, "user repository failed");
            Error::service_unavailable(context)
        }
    }
}

/// Map a notifications repository failure, using `context` as the client
/// message.
pub(crate) fn notification_persistence_failure(
    context: &str,
    err: NotificationPersistenceError,
) -> Error {
    error!(error = %err, kind = err.kind(), context, "notification repository failed");
    Error::service_unavailable(context)
}

/// JSON extractor settings reporting malformed bodies as `invalid_request`.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        Error::invalid_request(format!("Invalid request body: {err}")).into()
    })
}

/// Fallback for unknown paths under the API prefix.
pub async fn route_not_found(req: HttpRequest) -> ApiResult<HttpResponse> {
    Err(Error::not_found(format!(
        "No route for {} {}",
        req.method(),
        req.path()
    )))
}
