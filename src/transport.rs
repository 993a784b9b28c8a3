//! HTTP request/response abstraction used by the news service.
//!
//! The [`Transport`] trait issues a single GET or POST and resolves to exactly
//! one [`RequestResult`]: the parsed JSON body on a 2xx status, or a
//! [`TransportError`] carrying a readable message and the raw response.
//!
//! # Classification
//!
//! | Outcome | Result |
//! |---------|--------|
//! | Bad URL, header, or body | [`TransportError::Construction`] |
//! | Connect / TLS / timeout failure | [`TransportError::Network`] (status `0`) |
//! | Status outside `200..300` | [`TransportError::Status`] |
//! | 2xx with a body that is not JSON | [`TransportError::Parse`] |
//! | 2xx with a JSON body | `Ok(value)` |
//!
//! Nothing is retried.

use crate::utils::{redact_query_param, truncate_for_log};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Request};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Outcome of one transport call. Exactly one arm is populated.
pub type RequestResult = Result<Value, TransportError>;

/// What the transport saw on the wire, kept for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub method: String,
    /// Request URL with the API key redacted.
    pub url: String,
    /// HTTP status, or `0` when no response was received.
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Error. Request could not be built: {0}")]
    Construction(String),

    #[error("Error. Status code: {}", .raw.status)]
    Status { raw: RawResponse },

    #[error("Error. Status code: {} ({reason})", .raw.status)]
    Network { reason: String, raw: RawResponse },

    #[error("Error. Response body is not valid JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        raw: RawResponse,
    },
}

impl TransportError {
    /// The raw response behind this error, if a request was actually sent.
    pub fn raw(&self) -> Option<&RawResponse> {
        match self {
            TransportError::Construction(_) => None,
            TransportError::Status { raw }
            | TransportError::Network { raw, .. }
            | TransportError::Parse { raw, .. } => Some(raw),
        }
    }
}

/// Trait for issuing a single HTTP request.
///
/// Implementors resolve each call to exactly one [`RequestResult`]. The
/// controller is generic over this trait so tests can substitute a
/// recording transport.
pub trait Transport {
    /// Send a GET request and parse the response body as JSON.
    async fn get(&self, url: &str) -> RequestResult;

    /// Send `body` serialized as JSON, applying every entry of `headers`
    /// to the outgoing request.
    async fn post<B>(
        &self,
        url: &str,
        body: &B,
        headers: Option<&HashMap<String, String>>,
    ) -> RequestResult
    where
        B: Serialize + ?Sized;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Construction(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    #[cfg(test)]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    #[instrument(level = "info", skip_all, fields(method = %request.method(), url = %redact_query_param(request.url(), "apiKey")))]
    async fn execute(&self, request: Request) -> RequestResult {
        let method = request.method().to_string();
        let url = redact_query_param(request.url(), "apiKey");
        let t0 = Instant::now();

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                let status = e.status().map(|s| s.as_u16()).unwrap_or(0);
                warn!(elapsed_ms = t0.elapsed().as_millis(), error = %e, "Request failed before a response arrived");
                return Err(TransportError::Network {
                    reason: e.to_string(),
                    raw: RawResponse {
                        method,
                        url,
                        status,
                        body: String::new(),
                    },
                });
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(status = status.as_u16(), error = %e, "Failed reading response body");
                return Err(TransportError::Network {
                    reason: e.to_string(),
                    raw: RawResponse {
                        method,
                        url,
                        status: status.as_u16(),
                        body: String::new(),
                    },
                });
            }
        };

        let elapsed_ms = t0.elapsed().as_millis();
        let raw = RawResponse {
            method,
            url,
            status: status.as_u16(),
            body,
        };

        if !status.is_success() {
            warn!(
                status = raw.status,
                elapsed_ms,
                body_preview = %truncate_for_log(&raw.body, 300),
                "Request returned a non-success status"
            );
            return Err(TransportError::Status { raw });
        }

        match serde_json::from_str::<Value>(&raw.body) {
            Ok(value) => {
                info!(status = raw.status, elapsed_ms, bytes = raw.body.len(), "Request succeeded");
                Ok(value)
            }
            Err(source) => {
                warn!(
                    error = %source,
                    body_preview = %truncate_for_log(&raw.body, 300),
                    "Response body is not JSON"
                );
                Err(TransportError::Parse { source, raw })
            }
        }
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> RequestResult {
        let url = parse_url(url)?;
        let request = self
            .client
            .get(url)
            .build()
            .map_err(|e| TransportError::Construction(e.to_string()))?;
        self.execute(request).await
    }

    async fn post<B>(
        &self,
        url: &str,
        body: &B,
        headers: Option<&HashMap<String, String>>,
    ) -> RequestResult
    where
        B: Serialize + ?Sized,
    {
        let url = parse_url(url)?;
        let payload = serde_json::to_vec(body)
            .map_err(|e| TransportError::Construction(format!("body is not serializable: {e}")))?;

        let mut header_map = HeaderMap::new();
        header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (key, value) in headers.into_iter().flatten() {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| TransportError::Construction(format!("invalid header name {key:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::Construction(format!("invalid value for header {key:?}: {e}")))?;
            header_map.insert(name, value);
        }
        debug!(headers = header_map.len(), bytes = payload.len(), "Prepared POST request");

        let request = self
            .client
            .post(url)
            .headers(header_map)
            .body(payload)
            .build()
            .map_err(|e| TransportError::Construction(e.to_string()))?;
        self.execute(request).await
    }
}

fn parse_url(url: &str) -> Result<Url, TransportError> {
    Url::parse(url).map_err(|e| TransportError::Construction(format!("invalid url {url:?}: {e}")))
}
