//! HTTP transport for signed API calls.
//!
//! [`HttpTransport`] is the seam between the client and the network: the
//! production [`ReqwestTransport`] issues real requests, tests plug in a
//! scripted implementation. [`ApiTransport`] layers signing on top and
//! classifies every outcome as either a decoded JSON body or `None`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use crate::auth::{self, Signer};

/// Every request is abandoned after this long.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP methods used by the trading API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Wire name, also used verbatim in the signed message.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully prepared outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Status and raw body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Statuses of 400 and above are failures.
    pub const fn is_failure(&self) -> bool {
        self.status >= 400
    }
}

/// Why a request produced no usable body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("response body is not JSON: {0}")]
    Decode(String),
}

/// Executes prepared requests. Implementations perform exactly one attempt.
pub trait HttpTransport: Send + Sync {
    fn execute<'a>(&'a self, request: HttpRequest)
    -> BoxFuture<'a, Result<HttpResponse, TransportError>>;
}

/// Production transport backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        Box::pin(async move {
            let mut builder = match request.method {
                HttpMethod::Get => self.client.get(&request.url),
                HttpMethod::Post => self.client.post(&request.url),
            };

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            builder = builder.timeout(request.timeout);

            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(e.to_string())
                } else if e.is_connect() {
                    TransportError::Connect(e.to_string())
                } else {
                    TransportError::Request(e.to_string())
                }
            })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| TransportError::Request(format!("failed to read body: {e}")))?;

            Ok(HttpResponse { status, body })
        })
    }
}

/// Signs requests against a base URL and decodes their JSON bodies.
#[derive(Clone)]
pub struct ApiTransport {
    base_url: String,
    signer: Signer,
    http: Arc<dyn HttpTransport>,
}

impl fmt::Debug for ApiTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiTransport")
            .field("base_url", &self.base_url)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

impl ApiTransport {
    pub fn new(base_url: impl Into<String>, signer: Signer, http: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            signer,
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issues one signed request and returns the decoded body.
    ///
    /// Any failure (network error, timeout, status >= 400, non-JSON body)
    /// is logged and collapsed into `None`.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: &str,
    ) -> Option<serde_json::Value> {
        match self.try_request(method, path, body).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%method, path, error = %e, "API request failed");
                None
            }
        }
    }

    /// Same as [`request`](Self::request) but reports why it failed.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] describing the failed attempt.
    pub async fn try_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: &str,
    ) -> Result<serde_json::Value, TransportError> {
        let timestamp = auth::current_timestamp();
        let headers = self.signer.sign(timestamp, path, method.as_str(), body);

        let mut request = HttpRequest::new(method, format!("{}{path}", self.base_url));
        for (name, value) in headers.pairs() {
            request = request.with_header(name, value);
        }
        if method == HttpMethod::Post && !body.is_empty() {
            request = request
                .with_header("content-type", "application/json")
                .with_body(body);
        }

        let response = self.http.execute(request).await?;
        debug!(%method, path, status = response.status, "API response received");

        if response.is_failure() {
            return Err(TransportError::Status {
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
