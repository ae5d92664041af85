//! REST bindings for the store backend.
//!
//! # Architecture
//!
//! - One shared `reqwest::Client` with a cookie store, so the session cookie
//!   set by `POST /auth/login` rides along on every later request
//! - JSON request and response bodies only
//! - Responses are parsed into the typed records in [`types`]; a body that
//!   does not match is reported as [`ApiError::Parse`]
//! - The product catalog is cached in memory via `moka`
//!
//! Endpoint methods are grouped per resource in the submodules; they all go
//! through the request helpers defined here.

mod auth;
mod cart;
mod catalog;
mod checkout;
mod inventory;
pub mod types;
mod wishlist;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::ClientConfig;
use types::Product;

/// Longest slice of a response body kept in errors and logs.
const BODY_PREVIEW_LEN: usize = 200;

/// Errors that can occur when talking to the store backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, timeout or other transport failure.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The session is missing or lacks the required role (401/403).
    #[error("Unauthorized (HTTP {status})")]
    Unauthorized {
        /// Response status code.
        status: u16,
    },

    /// Any other non-success response.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// The response body did not match the expected record.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Whether the backend rejected the session (401/403).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the store's REST API.
///
/// Cheap to clone; clones share the connection pool, cookie jar and catalog
/// cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    catalog: Cache<&'static str, Arc<Vec<Product>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;

        let catalog = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                catalog,
            }),
        })
    }

    /// The API root all paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(status = %status, url = %response.url(), "Backend rejected session");
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
            });
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let preview = body.chars().take(BODY_PREVIEW_LEN).collect::<String>();
            warn!(status = %status, body = %preview, "Backend returned non-success status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: preview,
            });
        }

        Ok(body)
    }

    /// Parse a response body into a typed record.
    fn parse<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
        serde_json::from_str(body).map_err(|e| {
            error!(
                error = %e,
                body = %body.chars().take(BODY_PREVIEW_LEN).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_url(self.url(path)?).await
    }

    async fn get_url<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(%url, "GET");
        let body = self.send(self.inner.client.get(url)).await?;
        Self::parse(&body)
    }

    pub(crate) async fn post_json<B: Serialize + Sync>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<String, ApiError> {
        let url = self.url(path)?;
        debug!(%url, "POST");
        self.send(self.inner.client.post(url).json(payload)).await
    }

    pub(crate) async fn post_empty(&self, path: &str) -> Result<String, ApiError> {
        let url = self.url(path)?;
        debug!(%url, "POST");
        self.send(self.inner.client.post(url)).await
    }

    pub(crate) async fn put_json<B: Serialize + Sync>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<String, ApiError> {
        let url = self.url(path)?;
        debug!(%url, "PUT");
        self.send(self.inner.client.put(url).json(payload)).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path)?;
        debug!(%url, "DELETE");
        self.send(self.inner.client.delete(url)).await.map(|_| ())
    }
}
