//! Admin role check.
//!
//! # Trust boundary
//!
//! This check only keeps non-admins away from the admin commands. It is not
//! a security control: anyone holding the backend URL can call the admin
//! endpoints directly, so the backend must authorize every admin request
//! itself.

use robe_core::{Email, UserRole};
use tracing::{info, instrument, warn};

use crate::client::AdminClient;
use crate::error::{AdminError, Result};

/// A signed-in identity confirmed to hold the admin role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub email: Email,
}

pub struct AdminGuard;

impl AdminGuard {
    /// Look up `identity`'s role and allow only admins through.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::InvalidIdentity` for a malformed email and
    /// `AdminError::Forbidden` when the role is missing or not `admin`.
    #[instrument(skip(client))]
    pub async fn authorize(client: &AdminClient, identity: &str) -> Result<AdminSession> {
        let email = Email::parse(identity).map_err(AdminError::InvalidIdentity)?;
        match client.user_role(&email).await {
            Some(UserRole::Admin) => {
                info!(%email, "Admin access granted");
                sentry::configure_scope(|scope| {
                    scope.set_user(Some(sentry::User {
                        email: Some(email.to_string()),
                        ..Default::default()
                    }));
                });
                Ok(AdminSession { email })
            }
            role => {
                warn!(%email, role = ?role, "Admin access refused");
                Err(AdminError::Forbidden(email.to_string()))
            }
        }
    }
}
