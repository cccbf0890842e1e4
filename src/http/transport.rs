//! Transport abstraction and the default HTTP implementation.
//!
//! # Responsibilities
//! - Define the `fetch` contract the request pipeline delegates to
//! - Classify outcomes: 2xx completes, everything else fails
//! - Resolve relative URIs against an optional base URL
//!
//! # Design Decisions
//! - Timeouts are owned by the transport, never by the pipeline
//! - No retries; a failure is reported once
//! - Failures still carry a `Response` so middleware can inspect them

use std::time::Duration;

use futures_util::future::{self, BoxFuture, FutureExt};
use thiserror::Error;
use url::Url;

use crate::config::schema::TransportConfig;
use crate::http::request::{Headers, Method, Request};
use crate::http::response::Response;

/// Errors produced by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("{uri} returned status {}", .response.status)]
    Status { uri: String, response: Response },

    /// The request never produced a response (connect, timeout, body read).
    #[error("network error for {uri}: {message}")]
    Network { uri: String, message: String },

    /// A relative URI was submitted but no base URL is configured.
    #[error("cannot resolve `{0}`")]
    InvalidUri(String),

    /// No transport is installed under the requester setting.
    #[error("no transport configured")]
    NotConfigured,
}

impl TransportError {
    /// Response handed to `failed` middleware and failure callbacks.
    pub fn into_response(self) -> Response {
        match self {
            TransportError::Status { response, .. } => response,
            TransportError::Network { message, .. } => Response {
                errors: Some(message),
                ..Response::default()
            },
            other => Response {
                errors: Some(other.to_string()),
                ..Response::default()
            },
        }
    }
}

/// Something that can carry a request to a server and back.
pub trait Transport: Send + Sync {
    fn fetch<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, TransportError>>;
}

/// Synchronous closures are transports that complete immediately.
impl<F> Transport for F
where
    F: Fn(&Request) -> Result<Response, TransportError> + Send + Sync,
{
    fn fetch<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, TransportError>> {
        future::ready(self(request)).boxed()
    }
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Option<Url>,
    default_headers: Headers,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport from configuration.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let base_url = config
            .base_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| TransportError::InvalidUri(e.to_string()))?;

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network {
                uri: String::new(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            default_headers: config.default_headers.clone(),
            timeout,
        })
    }

    /// Whole-request timeout applied by the client.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn resolve(&self, uri: &str) -> Result<Url, TransportError> {
        match Url::parse(uri) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .base_url
                .as_ref()
                .and_then(|base| base.join(uri).ok())
                .ok_or_else(|| TransportError::InvalidUri(uri.to_string())),
            Err(_) => Err(TransportError::InvalidUri(uri.to_string())),
        }
    }

    async fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let url = self.resolve(&request.uri)?;
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url.clone());
        for (name, value) in self.default_headers.iter().chain(request.headers.iter()) {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.method != Method::Get {
            if let Some(data) = &request.data {
                builder = builder.json(data);
            }
        }

        let network = |e: reqwest::Error| TransportError::Network {
            uri: url.to_string(),
            message: e.to_string(),
        };

        let res = builder.send().await.map_err(network)?;
        let status = res.status();
        let payload = res.text().await.map_err(network)?;

        let response = Response::new(status.as_u16(), status.canonical_reason().unwrap_or_default())
            .with_payload(payload);

        if status.is_success() {
            Ok(response)
        } else {
            Err(TransportError::Status {
                uri: url.to_string(),
                response,
            })
        }
    }
}

/// No base URL, with the configured default timeout.
impl Default for HttpTransport {
    fn default() -> Self {
        let config = TransportConfig::default();
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            // `Client::new` would panic on the same build failure.
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: None,
            default_headers: config.default_headers,
            timeout,
        }
    }
}

impl Transport for HttpTransport {
    fn fetch<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, Result<Response, TransportError>> {
        self.send(request).boxed()
    }
}
