//! Transport seam between the request executor and the network.
//!
//! The executor only ever sees `HttpRequest`/`HttpResponse`, which keeps retry and
//! cache behaviour testable without sockets. Dropping the future returned by
//! `send` must abort the underlying I/O.

use crate::client::request::Method;
use crate::error::{FetchError, FetchResult};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;

/// A fully resolved request, ready to put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

/// Fields that make up the cache key.
#[derive(Serialize)]
struct CacheKeyParts<'a> {
    method: Method,
    url: &'a str,
    headers: BTreeMap<String, &'a str>,
    body: Option<&'a str>,
}

impl HttpRequest {
    /// Deterministic key over what actually goes on the wire.
    ///
    /// Covers the resolved URL (so clients with different base URLs never share
    /// entries), the merged headers with names lower-cased, and the serialized
    /// body. `serde_json::Value` objects serialize with sorted keys, so equal
    /// bodies always produce equal keys.
    pub fn cache_key(&self) -> String {
        let parts = CacheKeyParts {
            method: self.method,
            url: &self.url,
            headers: self
                .headers
                .iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value.as_str()))
                .collect(),
            body: self.body.as_deref(),
        };

        serde_json::to_string(&parts).unwrap_or_else(|_| format!("{} {}", self.method, self.url))
    }
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq)]
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

    /// Whether the status is in the 2xx class.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a single network exchange.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> FetchResult<HttpResponse>;
}

/// Production transport backed by a shared `reqwest::Client`.
///
/// No client-level timeout is configured; the executor bounds each attempt and
/// drops this future when the bound is exceeded, which closes the connection.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxies, TLS roots, pooling).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn map_error(error: reqwest::Error) -> FetchError {
        if error.is_builder() {
            FetchError::InvalidRequest(error.to_string())
        } else if error.is_connect() {
            FetchError::Network(format!("Connection failed: {}", error))
        } else {
            FetchError::Network(error.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> FetchResult<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method.to_reqwest(), request.url.as_str());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(Self::map_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(Self::map_error)?;

        tracing::trace!(url = %request.url, status, bytes = body.len(), "Response received");

        Ok(HttpResponse { status, body })
    }
}
