//! Resilient HTTP client for JSON APIs.
//!
//! `FetchClient` executes one logical request at a time per call: it consults a
//! TTL cache, bounds every network attempt with a timeout, retries transient
//! failures with capped exponential backoff and writes fresh results back to the
//! cache. Dropping a pending call aborts the in-flight attempt and any remaining
//! retries.

pub mod request;
pub mod retry;
pub mod transport;

pub use request::{FetchOptions, Method, RequestDescriptor, DEFAULT_MAX_RETRIES};
pub use retry::{AttemptOutcome, RetryPolicy};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

use crate::cache::TimedCache;
use crate::config::Config;
use crate::error::{FetchError, FetchResult};
use crate::metrics::{HttpTimer, Metrics};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Cache of decoded response bodies keyed by `HttpRequest::cache_key`.
pub type ResponseCache = TimedCache<String, Value>;

/// Resilient request executor.
///
/// Cheap to clone; clones share the transport, cache and metrics.
#[derive(Clone)]
pub struct FetchClient {
    /// Base URL that relative endpoints are joined onto
    base_url: String,

    /// Network seam
    transport: Arc<dyn HttpTransport>,

    /// Response cache, shared with any other client it was handed to
    cache: ResponseCache,

    /// Delay schedule between attempts
    retry_policy: RetryPolicy,

    /// Upper bound on a single attempt
    request_timeout: Duration,

    /// Retry budget for `fetch` calls that don't set one
    default_retries: u32,

    /// Metrics collector
    metrics: Metrics,
}

impl FetchClient {
    /// Create a FetchClient from configuration using the reqwest transport.
    pub fn new(config: &Config) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    /// Create a FetchClient from configuration with a custom transport.
    pub fn with_transport(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_url: config.base_url.clone(),
            transport,
            cache: TimedCache::with_ttl(config.cache_ttl()),
            retry_policy: config.retry_policy(),
            request_timeout: config.request_timeout(),
            default_retries: config.max_retries,
            metrics: Metrics::new(),
        }
    }

    /// Create a FetchClient with a custom base URL and default settings (useful for testing).
    #[doc(hidden)]
    pub fn with_base_url(base_url: String) -> Self {
        let config = Config {
            base_url,
            ..Config::default()
        };
        Self::new(&config)
    }

    /// Replace the response cache, e.g. to share one between clients.
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = cache;
        self
    }

    /// Replace the backoff schedule between attempts.
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Set the upper bound on a single attempt.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Set the retry budget used when a `fetch` call doesn't pass one.
    pub fn with_default_retries(mut self, retries: u32) -> Self {
        self.default_retries = retries;
        self
    }

    /// Get a reference to the metrics collector.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Get a reference to the response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Base URL that relative endpoints are joined onto.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upper bound on a single attempt.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Retry budget for `fetch` calls that don't set one.
    pub fn default_retries(&self) -> u32 {
        self.default_retries
    }

    /// Build a full URL from an endpoint. Absolute URLs pass through untouched.
    fn build_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }

        let base = self.base_url.trim_end_matches('/');
        let path = endpoint.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Resolve a descriptor into the request that goes on the wire.
    ///
    /// Caller headers override the JSON content type regardless of case.
    fn build_request(&self, descriptor: &RequestDescriptor) -> FetchResult<HttpRequest> {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        for (name, value) in &descriptor.headers {
            headers.retain(|existing: &String, _| !existing.eq_ignore_ascii_case(name));
            headers.insert(name.clone(), value.clone());
        }

        let body = descriptor
            .body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| FetchError::InvalidRequest(format!("Unserializable body: {}", e)))?;

        Ok(HttpRequest {
            method: descriptor.method,
            url: self.build_url(&descriptor.endpoint),
            headers,
            body,
        })
    }

    /// Decode a completed exchange, turning non-2xx statuses into errors.
    fn decode(response: HttpResponse) -> FetchResult<(u16, Value)> {
        if !response.is_success() {
            let message = reqwest::StatusCode::from_u16(response.status)
                .ok()
                .and_then(|status| status.canonical_reason())
                .unwrap_or("Unknown status")
                .to_string();

            return Err(FetchError::HttpStatus {
                status: response.status,
                message,
            });
        }

        if response.body.trim().is_empty() {
            return Ok((response.status, Value::Null));
        }

        let value = serde_json::from_str(&response.body)?;
        Ok((response.status, value))
    }

    /// One network attempt bounded by the request timeout.
    ///
    /// On timeout the transport future is dropped, which cancels its I/O.
    async fn attempt(&self, request: &HttpRequest) -> FetchResult<(u16, Value)> {
        let timer = HttpTimer::new(self.metrics.clone());

        let result = match tokio::time::timeout(self.request_timeout, self.transport.send(request))
            .await
        {
            Ok(Ok(response)) => Self::decode(response),
            Ok(Err(e)) => Err(e),
            Err(_) => {
                self.metrics.record_timeout();
                Err(FetchError::Timeout(self.request_timeout))
            }
        };

        match &result {
            Ok(_) => timer.complete(),
            Err(_) => timer.complete_with_error(),
        }

        result
    }

    /// Execute one logical request.
    ///
    /// Serves cacheable requests from the cache when possible; otherwise makes up
    /// to `max_retries + 1` attempts. Bad request and not found responses stop
    /// immediately. The last error is returned once the budget is spent.
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> FetchResult<Value> {
        let request = self.build_request(descriptor)?;
        let cache_key = descriptor.uses_cache().then(|| request.cache_key());

        if let Some(key) = &cache_key {
            if let Some(value) = self.cache.get(key) {
                self.metrics.record_cache_access(true);
                tracing::debug!(
                    method = %descriptor.method,
                    endpoint = %descriptor.endpoint,
                    "Cache hit"
                );
                return Ok(value);
            }
            self.metrics.record_cache_access(false);
        }

        let mut last_error = None;

        for attempt in 0..=descriptor.max_retries {
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                attempt = attempt + 1,
                max_attempts = descriptor.max_retries as u64 + 1,
                "Sending request"
            );

            match AttemptOutcome::from(self.attempt(&request).await) {
                AttemptOutcome::Success((status, value)) => {
                    if let Some(key) = cache_key {
                        if status == 200 {
                            self.cache.insert(key, value.clone());
                        }
                    }
                    return Ok(value);
                }
                AttemptOutcome::TerminalFailure(e) => {
                    tracing::warn!(url = %request.url, error = %e, "Request failed, not retrying");
                    return Err(e);
                }
                AttemptOutcome::RetryableFailure(e) => {
                    if attempt < descriptor.max_retries {
                        let delay = self.retry_policy.delay_for(attempt);
                        tracing::warn!(
                            url = %request.url,
                            attempt = attempt + 1,
                            error = %e,
                            "Attempt failed, retrying in {:?}",
                            delay
                        );
                        self.metrics.record_retry();
                        last_error = Some(e);
                        tokio::time::sleep(delay).await;
                    } else {
                        tracing::error!(
                            url = %request.url,
                            attempts = attempt as u64 + 1,
                            error = %e,
                            "Request failed, retries exhausted"
                        );
                        last_error = Some(e);
                    }
                }
            }
        }

        Err(last_error.unwrap_or(FetchError::ExhaustedRetries {
            attempts: descriptor.max_retries.saturating_add(1),
        }))
    }

    /// Cache key `execute` uses for `descriptor` on this client.
    ///
    /// Derived from the resolved request, so it includes the base URL and the
    /// merged headers.
    pub fn cache_key(&self, descriptor: &RequestDescriptor) -> FetchResult<String> {
        Ok(self.build_request(descriptor)?.cache_key())
    }

    /// Execute a request, abandoning it as soon as `cancel` completes.
    ///
    /// Abandoning drops the in-flight attempt (aborting its I/O) and skips any
    /// remaining backoff and retries. No partial result is returned.
    pub async fn execute_cancellable<F>(
        &self,
        descriptor: &RequestDescriptor,
        cancel: F,
    ) -> FetchResult<Value>
    where
        F: Future<Output = ()> + Send,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                tracing::debug!(endpoint = %descriptor.endpoint, "Request cancelled by caller");
                Err(FetchError::Cancelled)
            }
            result = self.execute(descriptor) => result,
        }
    }

    /// Fetch `endpoint` with optional overrides and return the decoded JSON body.
    pub async fn fetch(&self, endpoint: &str, options: FetchOptions) -> FetchResult<Value> {
        let descriptor = options.into_descriptor(endpoint, self.default_retries);
        self.execute(&descriptor).await
    }

    /// Like `fetch`, decoding the body into `T`.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: FetchOptions,
    ) -> FetchResult<T> {
        let value = self.fetch(endpoint, options).await?;
        Ok(serde_json::from_value(value)?)
    }
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("cache", &self.cache)
            .field("retry_policy", &self.retry_policy)
            .field("request_timeout", &self.request_timeout)
            .field("default_retries", &self.default_retries)
            .finish()
    }
}
