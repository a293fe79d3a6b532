//! Resilient Fetch - a JSON HTTP client with caching, timeouts and retries.
//!
//! The client wraps one logical request per call: it serves repeat reads from a
//! TTL cache, bounds every network attempt with a timeout, and retries transient
//! failures with capped exponential backoff. A small PokéAPI layer and the
//! `pokefetch` binary sit on top.
//!
//! # Architecture
//!
//! - **cache**: Thread-safe TTL cache with lazy expiry
//! - **client**: Request executor, retry policy and the transport seam
//! - **config**: Configuration management from environment variables
//! - **error**: Custom error types for precise error handling
//! - **metrics**: Attempt, retry and cache counters
//! - **pokeapi**: Typed PokéAPI endpoints

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pokeapi;

pub use cache::TimedCache;
pub use client::{
    AttemptOutcome, FetchClient, FetchOptions, HttpRequest, HttpResponse, HttpTransport, Method,
    ReqwestTransport, RequestDescriptor, RetryPolicy,
};
pub use config::Config;
pub use error::{ConfigError, FetchError, FetchResult};
pub use metrics::{HttpTimer, Metrics, MetricsSummary};
pub use pokeapi::{NamedResource, NamedResourceList, PokeApiClient, Pokemon};
