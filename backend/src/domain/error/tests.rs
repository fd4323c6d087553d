//! Tests for domain error construction and trace capture.

use super::*;
use rstest::rstest;
use uuid::Uuid;

#[rstest]
#[case::invalid(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case::missing(Error::not_found("missing"), ErrorCode::NotFound)]
#[case::conflict(Error::conflict("taken"), ErrorCode::Conflict)]
#[case::unavailable(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case::internal(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn new_has_no_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_scoped_trace_id() {
    let trace_id = TraceId::from_uuid(Uuid::nil());

    let error = TraceId::scope(trace_id, async { Error::not_found("missing") }).await;

    assert_eq!(
        error.trace_id(),
        Some("00000000-0000-0000-0000-000000000000")
    );
}

#[rstest]
fn with_trace_id_overrides_capture() {
    let error = Error::conflict("taken").with_trace_id("abc");
    assert_eq!(error.trace_id(), Some("abc"));
}

#[rstest]
#[case(ErrorCode::InvalidRequest)]
#[case(ErrorCode::NotFound)]
#[case(ErrorCode::Conflict)]
#[case(ErrorCode::ServiceUnavailable)]
#[case(ErrorCode::InternalError)]
fn wire_form_matches_serde(#[case] code: ErrorCode) {
    let encoded = serde_json::to_value(code).expect("code serialises");
    assert_eq!(encoded, serde_json::Value::from(code.as_str()));
}

#[rstest]
fn display_shows_message() {
    assert_eq!(Error::not_found("User not found").to_string(), "User not found");
}
