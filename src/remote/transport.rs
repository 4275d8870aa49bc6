//! HTTP transport seam
//!
//! The client talks to the platform through [`Transport`]. The blocking
//! `reqwest` implementation is used by the binaries; tests plug in an
//! in-memory platform.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE};
use serde_json::Value;

use crate::config::Settings;
use crate::error::{OnboardError, OnboardResult};

/// Request body as sent on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// Compact signed token carrying the JSON payload.
    Signed(String),
}

impl RequestBody {
    pub fn into_bytes(self) -> OnboardResult<Vec<u8>> {
        match self {
            RequestBody::Json(value) => Ok(serde_json::to_vec(&value)?),
            RequestBody::Signed(token) => Ok(token.into_bytes()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// One POST per call, no retries.
pub trait Transport: Send {
    fn post(&self, url: &str, body: RequestBody) -> OnboardResult<TransportResponse>;
}

/// Blocking HTTP transport with the session cookie and JSON content type on every request.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(settings: &Settings) -> OnboardResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = settings.session.login_token.as_deref() {
            let cookie = format!("{}={}", settings.session.cookie_name, token);
            let value = HeaderValue::from_str(&cookie).map_err(|e| {
                OnboardError::Config(format!("Login token is not a valid cookie value: {}", e))
            })?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.http.timeout_secs))
            .build()
            .map_err(|e| OnboardError::Transport(format!("Cannot build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &str, body: RequestBody) -> OnboardResult<TransportResponse> {
        let response = self
            .client
            .post(url)
            .body(body.into_bytes()?)
            .send()
            .map_err(|e| OnboardError::Transport(format!("POST {} failed: {}", url, e)))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| OnboardError::Transport(format!("Reading {} failed: {}", url, e)))?;
        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_bytes() {
        let json = RequestBody::Json(json!({"a": 1})).into_bytes().unwrap();
        assert_eq!(json, br#"{"a":1}"#.to_vec());
        let signed = RequestBody::Signed("x.y.z".to_string()).into_bytes().unwrap();
        assert_eq!(signed, b"x.y.z".to_vec());
    }

    #[test]
    fn test_http_transport_rejects_bad_cookie() {
        let mut settings = Settings::default();
        settings.session.login_token = Some("bad\ntoken".to_string());
        assert!(HttpTransport::new(&settings).is_err());
    }

    #[test]
    fn test_http_transport_builds() {
        let mut settings = Settings::default();
        settings.session.login_token = Some("abc123".to_string());
        assert!(HttpTransport::new(&settings).is_ok());
    }

    #[test]
    fn test_success_is_200_only() {
        let ok = TransportResponse { status: 200, body: String::new() };
        let created = TransportResponse { status: 201, body: String::new() };
        assert!(ok.is_success());
        assert!(!created.is_success());
    }
}
