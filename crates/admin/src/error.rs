//! Unified error handling with Sentry integration.

use robe_core::EmailError;
use thiserror::Error;

use crate::client::AdminApiError;
use crate::config::ConfigError;
use crate::products::FormError;

/// Application-level error type for the admin console.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Admin API operation failed.
    #[error("Backend error: {0}")]
    Api(#[from] AdminApiError),

    /// A form failed validation.
    #[error("Invalid input: {0}")]
    Form(#[from] FormError),

    /// The signed-in identity is not a valid email.
    #[error("Invalid identity: {0}")]
    InvalidIdentity(EmailError),

    /// The signed-in identity is not an admin.
    #[error("Forbidden: {0} is not an admin")]
    Forbidden(String),
}

impl AdminError {
    /// Capture server-side failures to Sentry and return the message to
    /// show the operator.
    #[must_use]
    pub fn report(&self) -> String {
        if matches!(self, Self::Api(e) if e.is_server_side()) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin error"
            );
        }
        match self {
            Self::Forbidden(_) => "Access denied: admin role required".to_string(),
            Self::Api(AdminApiError::Unauthorized(_)) => {
                "The backend refused the admin token".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for `AdminError`.
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_error_display() {
        let err = AdminError::Forbidden("nadia@example.com".to_string());
        assert_eq!(err.to_string(), "Forbidden: nadia@example.com is not an admin");
        assert_eq!(err.report(), "Access denied: admin role required");

        let err = AdminError::Form(FormError::MissingImage);
        assert_eq!(err.report(), "Invalid input: an image is required; upload one first");
    }
}
