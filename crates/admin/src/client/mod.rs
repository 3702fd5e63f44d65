//! Admin REST client (HIGH PRIVILEGE).
//!
//! # Security
//!
//! This client can create, edit and delete products and coupons and read
//! every order and user. The backend must authorize each of these endpoints
//! on its own; the optional bearer token from `ROBE_ADMIN_TOKEN` is sent
//! with every request for that purpose.
//!
//! # Example
//!
//! ```rust,ignore
//! use robe_admin::client::AdminClient;
//!
//! let client = AdminClient::new(&config)?;
//! let products = client.list_products().await?;
//! client.delete_product(&products[0].id).await?;
//! ```

mod catalog;
mod coupons;
mod orders;

use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use robe_core::wire::{self, REQUEST_ID_HEADER};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::config::AdminConfig;

/// Errors that can occur when talking to the admin endpoints.
#[derive(Debug, Error)]
pub enum AdminApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success status.
    #[error("Backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// An endpoint URL could not be built.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl AdminApiError {
    /// Whether the failure is on the backend side (or the network).
    #[must_use]
    pub const fn is_server_side(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) | Self::RateLimited(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::NotFound(_) | Self::Unauthorized(_) | Self::InvalidUrl(_) => false,
        }
    }
}

/// Client for the admin endpoints.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl AdminClient {
    /// Create a new admin client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AdminConfig) -> Result<Self, AdminApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("robe-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                base_url: config.api_url.clone(),
                token: config.token.clone(),
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AdminApiError> {
        wire::endpoint(&self.inner.base_url, segments)
            .ok_or_else(|| AdminApiError::InvalidUrl(self.inner.base_url.to_string()))
    }

    fn get(&self, segments: &[&str]) -> Result<RequestBuilder, AdminApiError> {
        Ok(self.inner.client.get(self.endpoint(segments)?))
    }

    fn post(&self, segments: &[&str]) -> Result<RequestBuilder, AdminApiError> {
        Ok(self.inner.client.post(self.endpoint(segments)?))
    }

    fn put(&self, segments: &[&str]) -> Result<RequestBuilder, AdminApiError> {
        Ok(self.inner.client.put(self.endpoint(segments)?))
    }

    fn delete(&self, segments: &[&str]) -> Result<RequestBuilder, AdminApiError> {
        Ok(self.inner.client.delete(self.endpoint(segments)?))
    }

    /// Send a request and decode its JSON body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AdminApiError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| parse_failure(&body, e))
    }

    /// `GET /{collection}`, accepting a bare list or one wrapped under the
    /// collection's name.
    async fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, AdminApiError> {
        let body = self.send(self.get(&[collection])?).await?;
        wire::decode_list(&body, collection).map_err(|e| parse_failure(&body, e))
    }

    /// `GET /{collection}/{id}`, accepting a bare or wrapped record.
    async fn fetch<T: DeserializeOwned>(
        &self,
        collection: &str,
        wrapper: &str,
        id: &str,
    ) -> Result<Option<T>, AdminApiError> {
        let body = self.send(self.get(&[collection, id])?).await?;
        wire::decode_one(&body, wrapper).map_err(|e| parse_failure(&body, e))
    }

    /// Send a request, returning the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, AdminApiError> {
        let request_id = Uuid::new_v4();
        let mut request = request.header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(%request_id, status = %status, "admin backend responded");

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(AdminApiError::RateLimited(retry_after));
        }

        let body = response.text().await?;
        if status.is_success() {
            return Ok(body);
        }

        let message = wire::error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        tracing::warn!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "Admin backend returned non-success status"
        );
        Err(match status {
            StatusCode::NOT_FOUND => AdminApiError::NotFound(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AdminApiError::Unauthorized(message),
            _ => AdminApiError::Status {
                status: status.as_u16(),
                message,
            },
        })
    }
}

fn parse_failure(body: &str, error: serde_json::Error) -> AdminApiError {
    tracing::error!(
        error = %error,
        body = %body.chars().take(500).collect::<String>(),
        "Failed to parse admin response"
    );
    AdminApiError::Parse(error)
}
