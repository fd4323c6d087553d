//! Shared reqwest transport for the backend and the carts feed.
//!
//! The transport owns URL construction, status checking, and error mapping.
//! Resource adapters only pick the method, path, and envelope fields.

use std::time::Duration;

use envelope::{
    AckEnvelope, EnvelopeError, EnvelopeFields, ErrorEnvelope, ListEnvelope, RecordEnvelope,
};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::ClientError;
use crate::ports::Reply;

/// HTTP transport rooted at one base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    /// Build a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] when `base` cannot carry path
    /// segments or the reqwest client cannot be built.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, ClientError> {
        if base.cannot_be_a_base() {
            return Err(ClientError::invalid_config(format!(
                "base URL {base} cannot carry resource paths"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ClientError::invalid_config(format!("HTTP client: {error}")))?;
        Ok(Self { client, base })
    }

    /// Root URL every endpoint is resolved against.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Append path segments to the base URL, percent-encoding each one.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use admin_client::rest::HttpTransport;
    ///
    /// let base = "http://localhost:5000/api".parse().expect("valid URL");
    /// let transport = HttpTransport::new(base, Duration::from_secs(1)).expect("transport");
    /// let url = transport.endpoint(["users", "abc"]);
    /// assert_eq!(url.as_str(), "http://localhost:5000/api/users/abc");
    /// ```
    pub fn endpoint<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so segments are always available.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) async fn fetch_list<T: DeserializeOwned>(
        &self,
        url: Url,
        fields: EnvelopeFields,
    ) -> Result<Reply<Vec<T>>, ClientError> {
        let (status, body) = self.execute(self.request(Method::GET, url)).await?;
        let envelope =
            ListEnvelope::from_slice(&body, fields).map_err(|error| decode_error(status, &error))?;
        Ok(Reply::new(envelope.items, envelope.toast))
    }

    pub(crate) async fn send_record<T, B>(
        &self,
        method: Method,
        url: Url,
        body: &B,
        fields: EnvelopeFields,
    ) -> Result<Reply<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let (status, payload) = self.execute(self.request(method, url).json(body)).await?;
        let envelope = RecordEnvelope::from_slice(&payload, fields)
            .map_err(|error| decode_error(status, &error))?;
        Ok(Reply::new(envelope.record, envelope.toast))
    }

    pub(crate) async fn send_ack(&self, method: Method, url: Url) -> Result<Reply<()>, ClientError> {
        let (status, body) = self.execute(self.request(method, url)).await?;
        let ack = AckEnvelope::from_slice(&body).map_err(|error| decode_error(status, &error))?;
        Ok(Reply::new((), ack.toast))
    }

    pub(crate) async fn fetch_raw(&self, url: Url) -> Result<(StatusCode, Vec<u8>), ClientError> {
        self.execute(self.request(Method::GET, url)).await
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "sending request");
        self.client
            .request(method, url)
            .header(ACCEPT, "application/json")
    }

    async fn execute(&self, request: RequestBuilder) -> Result<(StatusCode, Vec<u8>), ClientError> {
        let response = request.send().await.map_err(|error| map_transport_error(&error))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| map_transport_error(&error))?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok((status, body.to_vec()))
    }
}

fn map_transport_error(error: &reqwest::Error) -> ClientError {
    let status = error.status().map(|status| status.as_u16());
    if error.is_timeout() {
        ClientError::request_failed(status, format!("request timed out: {error}"))
    } else {
        ClientError::request_failed(status, format!("transport failed: {error}"))
    }
}

/// Prefer the server's own error text; fall back to a compact body preview.
pub(crate) fn map_status_error(status: StatusCode, body: &[u8]) -> ClientError {
    let server_message = serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error)
        .filter(|message| !message.trim().is_empty());
    let message = server_message.unwrap_or_else(|| {
        let preview = body_preview(body);
        if preview.is_empty() {
            format!("status {}", status.as_u16())
        } else {
            format!("status {}: {preview}", status.as_u16())
        }
    });
    ClientError::request_failed(status.as_u16(), message)
}

pub(crate) fn decode_error(status: StatusCode, error: &EnvelopeError) -> ClientError {
    ClientError::request_failed(status.as_u16(), format!("unexpected response body: {error}"))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the non-network transport helpers.

    use super::*;
    use rstest::rstest;

    fn transport(base: &str) -> HttpTransport {
        let url = Url::parse(base).expect("valid URL");
        HttpTransport::new(url, Duration::from_secs(1)).expect("transport builds")
    }

    #[rstest]
    #[case::no_trailing_slash("http://localhost:5000/api")]
    #[case::trailing_slash("http://localhost:5000/api/")]
    fn endpoint_appends_segments(#[case] base: &str) {
        let url = transport(base).endpoint(["notifications", "n-1"]);
        assert_eq!(url.as_str(), "http://localhost:5000/api/notifications/n-1");
    }

    #[rstest]
    fn endpoint_percent_encodes_ids() {
        let url = transport("http://localhost:5000/api").endpoint(["users", "a/b"]);
        assert_eq!(url.as_str(), "http://localhost:5000/api/users/a%2Fb");
    }

    #[rstest]
    fn rejects_bases_without_paths() {
        let url = Url::parse("mailto:ops@example.com").expect("valid URL");
        let error = HttpTransport::new(url, Duration::from_secs(1)).expect_err("rejected");
        assert!(matches!(error, ClientError::InvalidConfig { .. }));
    }

    #[rstest]
    fn status_error_prefers_server_message() {
        let error = map_status_error(
            StatusCode::NOT_FOUND,
            br#"{"error": "User not found", "toast": {"type": "error", "message": "User not found"}}"#,
        );
        assert_eq!(error, ClientError::request_failed(404, "User not found"));
        assert!(error.is_not_found());
    }

    #[rstest]
    #[case::empty(b"".as_slice(), "status 502")]
    #[case::html(b"<html>\n  bad   gateway\n</html>".as_slice(), "status 502: <html> bad gateway </html>")]
    fn status_error_falls_back_to_preview(#[case] body: &[u8], #[case] expected: &str) {
        let error = map_status_error(StatusCode::BAD_GATEWAY, body);
        assert_eq!(error, ClientError::request_failed(502, expected));
    }

    #[rstest]
    fn body_preview_truncates_long_bodies() {
        let body = "x".repeat(200);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }
}
