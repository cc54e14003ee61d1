//! Client for the remote store API.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; the API owns every record and rule
//! - One method per endpoint, grouped by area in submodules
//! - Catalog listings (brands, models, products) are cached in memory via
//!   `moka`; catalog writes invalidate the cache
//! - Every request carries a fresh `x-request-id` for correlation with the
//!   server's logs
//!
//! # Example
//!
//! ```rust,ignore
//! use moto_parts_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config.api)?;
//! let products = api.products().await?;
//! let addresses = api.addresses(user_id).await?;
//! ```

mod accounts;
mod cache;
mod catalog;
mod orders;
mod reviews;
pub mod types;

pub use types::*;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use moka::future::Cache;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Maximum catalog listings kept in the cache.
const CACHE_CAPACITY: u64 = 16;

/// How much of an error body is kept in logs and error messages.
const ERROR_BODY_PREVIEW: usize = 200;

/// Errors that can occur when talking to the store API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// The API rejected the credentials or the session.
    #[error("Unauthorized")]
    Unauthorized,

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The API answered with JSON we could not decode.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint path did not form a valid URL.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Client for the store API.
///
/// Cheap to clone; clones share the connection pool and the catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
    /// Bumped by every invalidation; a listing fetched under an older
    /// generation is returned but not cached.
    generation: AtomicU64,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("moto-parts/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
                generation: AtomicU64::new(0),
            }),
        })
    }

    /// Base URL endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop every cached catalog listing.
    pub fn invalidate_catalog(&self) {
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Send a request and return the body of a successful response.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<String, ApiError> {
        let request_id = Uuid::new_v4().to_string();

        let response = request
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let preview = body.chars().take(ERROR_BODY_PREVIEW).collect::<String>();
        tracing::warn!(
            status = %status,
            path,
            request_id,
            body = %preview,
            "Store API returned non-success status"
        );

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
            StatusCode::NOT_FOUND => ApiError::NotFound(path.to_string()),
            _ => ApiError::Status {
                status: status.as_u16(),
                message: preview,
            },
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let body = self.execute(self.inner.client.get(url), path).await?;
        parse(&body, path)
    }

    async fn send<B, T>(&self, method: Method, path: &str, payload: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let request = self.inner.client.request(method, url).json(payload);
        let body = self.execute(request, path).await?;
        parse(&body, path)
    }

    /// Send a write whose response body carries nothing we need.
    async fn send_unit<B>(&self, method: Method, path: &str, payload: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        let request = self.inner.client.request(method, url).json(payload);
        self.execute(request, path).await.map(drop)
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        self.execute(self.inner.client.delete(url), path)
            .await
            .map(drop)
    }

    async fn cached<T, F>(
        &self,
        key: CacheKey,
        path: &str,
        wrap: fn(Vec<T>) -> CacheValue,
        unwrap: F,
    ) -> Result<Vec<T>, ApiError>
    where
        T: DeserializeOwned + Clone,
        F: Fn(CacheValue) -> Option<Vec<T>>,
    {
        if let Some(hit) = self.inner.cache.get(&key).await.and_then(&unwrap) {
            tracing::debug!(?key, "Cache hit for catalog listing");
            return Ok(hit);
        }

        let generation = self.inner.generation.load(Ordering::Acquire);
        let items: Vec<T> = self.get(path).await?;
        if self.inner.generation.load(Ordering::Acquire) == generation {
            self.inner.cache.insert(key, wrap(items.clone())).await;
        } else {
            tracing::debug!(?key, "Catalog changed during fetch, not caching listing");
        }
        Ok(items)
    }
}

fn parse<T: DeserializeOwned>(body: &str, path: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            path,
            body = %body.chars().take(ERROR_BODY_PREVIEW * 2).collect::<String>(),
            "Failed to parse store API response"
        );
        ApiError::Parse(e)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let api = client("http://store.test/api");
        assert_eq!(
            api.endpoint("/addresses/4").unwrap().as_str(),
            "http://store.test/api/addresses/4"
        );
        assert_eq!(
            api.endpoint("order-lines").unwrap().as_str(),
            "http://store.test/api/order-lines"
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - boom");
        assert_eq!(
            ApiError::NotFound("products/9".to_string()).to_string(),
            "Not found: products/9"
        );
    }

    #[test]
    fn test_parse_reports_bad_json() {
        let result: Result<Vec<u32>, _> = parse("{not json", "brands");
        assert!(matches!(result, Err(ApiError::Parse(_))));
    }
}
