//! REST client for the storefront's backend.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP with `reqwest`; the backend owns products,
//!   coupons and orders
//! - In-memory caching via `moka` for catalog responses (TTL from config)
//! - Every request carries an `x-request-id` and runs inside a `tracing` span
//!
//! # Example
//!
//! ```rust,ignore
//! use robe_storefront::api::StorefrontClient;
//!
//! let client = StorefrontClient::new(&config)?;
//! let products = client.list_products().await?;
//! let verdict = client.verify_coupon(&CouponCode::parse("EID50")?).await?;
//! ```

mod cache;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{RequestBuilder, StatusCode};
use robe_core::wire::{self, REQUEST_ID_HEADER};
use robe_core::{CouponCode, CouponVerification, OrderDraft, OrderId, Product, ProductId};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use crate::config::StorefrontConfig;

use cache::{CacheKey, CacheValue};

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// An endpoint URL could not be built from the base URL.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Whether the failure is the backend's fault (or unreachable) rather
    /// than a problem with the request.
    #[must_use]
    pub const fn is_server_side(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) | Self::RateLimited(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::NotFound(_) | Self::InvalidUrl(_) => false,
        }
    }
}

/// Result of a successful order submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    /// Identifier assigned by the backend, when it reports one.
    pub order_id: Option<OrderId>,
}

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the storefront-facing backend endpoints.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl StorefrontClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("robe-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(StorefrontClientInner {
                client,
                base_url: config.api_url.clone(),
                cache,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        wire::endpoint(&self.inner.base_url, segments)
            .ok_or_else(|| ApiError::InvalidUrl(self.inner.base_url.to_string()))
    }

    /// Send a request and return the raw status and body.
    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, String), ApiError> {
        let request_id = Uuid::new_v4();
        let response = request
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await?;

        let status = response.status();
        debug!(%request_id, status = %status, "backend responded");

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let body = response.text().await?;
        Ok((status, body))
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the full product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let url = self.endpoint(&["products"])?;
        let (status, body) = self.send(self.inner.client.get(url)).await?;
        check_status(status, &body)?;
        let products = Arc::new(
            wire::decode_list::<Product>(&body, "products").map_err(|e| parse_failure(&body, e))?,
        );

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids, or any transport error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&["products", id.as_str()])?;
        let (status, body) = self.send(self.inner.client.get(url)).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("Product not found: {id}")));
        }
        check_status(status, &body)?;

        let Some(product) =
            wire::decode_one::<Product>(&body, "product").map_err(|e| parse_failure(&body, e))?
        else {
            return Err(ApiError::NotFound(format!("Product not found: {id}")));
        };

        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Drop every cached catalog response.
    pub fn invalidate(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Ask the backend whether `code` is a valid coupon.
    ///
    /// The backend may reject a code either with `200 {valid: false}` or with
    /// a 4xx carrying the same body; both come back as an invalid
    /// [`CouponVerification`]. Other failures are errors.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, 5xx, or an unreadable body.
    #[instrument(skip(self), fields(code = %code))]
    pub async fn verify_coupon(&self, code: &CouponCode) -> Result<CouponVerification, ApiError> {
        let url = self.endpoint(&["verify-coupon"])?;
        let request = self
            .inner
            .client
            .post(url)
            .json(&serde_json::json!({ "code": code }));
        let (status, body) = self.send(request).await?;

        if status.is_client_error()
            && let Ok(verdict) = serde_json::from_str::<CouponVerification>(&body)
        {
            return Ok(CouponVerification {
                valid: false,
                ..verdict
            });
        }
        check_status(status, &body)?;
        decode(&body)
    }

    /// Submit an order. Called exactly once per checkout attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, draft), fields(items = draft.items.len(), total = %draft.total_amount))]
    pub async fn create_order(&self, draft: &OrderDraft) -> Result<OrderReceipt, ApiError> {
        let url = self.endpoint(&["orders"])?;
        let (status, body) = self.send(self.inner.client.post(url).json(draft)).await?;
        check_status(status, &body)?;

        Ok(OrderReceipt {
            order_id: wire::inserted_id(&body).map(OrderId::from),
        })
    }
}

/// Turn a non-success status into an `ApiError`.
pub(crate) fn check_status(status: StatusCode, body: &str) -> Result<(), ApiError> {
    if status.is_success() {
        return Ok(());
    }
    let message = wire::error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    tracing::warn!(
        status = %status,
        body = %body.chars().take(200).collect::<String>(),
        "Backend returned non-success status"
    );
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(message));
    }
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Decode a JSON body, logging a prefix of it on failure.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| parse_failure(body, e))
}

fn parse_failure(body: &str, error: serde_json::Error) -> ApiError {
    tracing::error!(
        error = %error,
        body = %body.chars().take(500).collect::<String>(),
        "Failed to parse backend response"
    );
    ApiError::Parse(error)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> StorefrontClient {
        let config = StorefrontConfig::from_lookup(|key| {
            (key == "ROBE_API_URL").then(|| base.to_string())
        })
        .unwrap();
        StorefrontClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_keeps_prefix_and_encodes() {
        let client = client("https://api.robe.shop/v1");
        let url = client.endpoint(&["products", "a b"]).unwrap();
        assert_eq!(url.as_str(), "https://api.robe.shop/v1/products/a%20b");
    }

    #[test]
    fn test_check_status_extracts_message() {
        let err = check_status(StatusCode::BAD_REQUEST, r#"{"message":"Cart is empty"}"#).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Status { status: 400, ref message } if message == "Cart is empty"
        ));

        let err = check_status(StatusCode::BAD_GATEWAY, "<html>").unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 502, ref message } if message == "Bad Gateway"));
        assert!(err.is_server_side());

        assert!(matches!(
            check_status(StatusCode::NOT_FOUND, "{}"),
            Err(ApiError::NotFound(_))
        ));
        assert!(check_status(StatusCode::CREATED, "").is_ok());
    }
}
