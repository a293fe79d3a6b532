//! Request descriptors and the options callers build them from.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Retries used when neither the caller nor the configuration says otherwise.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Whether the method writes upstream state. Mutating requests are never
    /// served from or written to the cache.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Method::Post | Method::Put | Method::Patch | Method::Delete
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical request: what to call, and how hard to try.
///
/// Built fresh by the caller for each call and never mutated by the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// Path relative to the client's base URL, or an absolute `http(s)://` URL
    pub endpoint: String,
    pub method: Method,
    /// Extra headers, merged over `Content-Type: application/json`
    pub headers: BTreeMap<String, String>,
    /// JSON body, serialized as-is
    pub body: Option<Value>,
    /// Consult and populate the cache (ignored for mutating methods)
    pub use_cache: bool,
    /// Attempts after the first; total attempts are `max_retries + 1`
    pub max_retries: u32,
}

impl RequestDescriptor {
    /// Create a descriptor with caching on and the default retry budget.
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            headers: BTreeMap::new(),
            body: None,
            use_cache: true,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Shorthand for a cached GET.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Get, endpoint)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Whether this request reads from and writes to the cache.
    pub fn uses_cache(&self) -> bool {
        self.use_cache && !self.method.is_mutating()
    }
}

/// Caller-facing options for `FetchClient::fetch`.
///
/// Every field is optional; unset fields fall back to a cached GET with the
/// client's default retry budget.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOptions {
    pub method: Option<Method>,
    pub headers: Option<BTreeMap<String, String>>,
    pub body: Option<Value>,
    pub use_cache: Option<bool>,
    pub retries: Option<u32>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = Some(use_cache);
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Resolve into a descriptor for `endpoint`.
    pub fn into_descriptor(self, endpoint: &str, default_retries: u32) -> RequestDescriptor {
        RequestDescriptor {
            endpoint: endpoint.to_string(),
            method: self.method.unwrap_or_default(),
            headers: self.headers.unwrap_or_default(),
            body: self.body,
            use_cache: self.use_cache.unwrap_or(true),
            max_retries: self.retries.unwrap_or(default_retries),
        }
    }
}
