//! Unified error handling with Sentry integration.
//!
//! Every storefront failure ends up as a [`Notice`] for the user. Failures
//! that are the backend's fault are captured to Sentry first; mistakes the
//! user can fix (empty cart, bad coupon, unknown product) are not.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::StorageError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::notice::Notice;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend request failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Local storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Checkout was refused or failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this error should be reported to Sentry.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        match self {
            Self::Api(e) | Self::Checkout(CheckoutError::Api(e)) => e.is_server_side(),
            Self::Storage(_) => true,
            Self::Config(_) | Self::Checkout(_) | Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }

    /// Capture to Sentry when reportable, then turn into a user notice.
    #[must_use]
    pub fn report(&self) -> Notice {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        }
        self.notice()
    }

    /// User-facing message, without internal details for server faults.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Checkout(e) => e.notice(),
            Self::Api(ApiError::NotFound(what)) | Self::NotFound(what) => Notice::error(format!("Not found: {what}")),
            Self::Api(ApiError::RateLimited(secs)) => {
                Notice::error(format!("Too many requests, try again in {secs}s"))
            }
            Self::Api(_) => Notice::error("Could not reach the shop. Please try again."),
            Self::Storage(_) => Notice::error("Could not read the saved cart"),
            Self::Config(e) => Notice::error(e.to_string()),
            Self::BadRequest(message) => Notice::error(message.clone()),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from the checkout email.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
