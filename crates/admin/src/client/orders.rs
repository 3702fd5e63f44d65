//! Orders, users and roles.

use robe_core::{Email, Order, User, UserRole};
use serde::Deserialize;
use tracing::{instrument, warn};

use super::{AdminApiError, AdminClient};

#[derive(Deserialize)]
struct RoleResponse {
    #[serde(default)]
    role: Option<UserRole>,
}

impl AdminClient {
    /// List every order, newest handling left to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, AdminApiError> {
        self.list("orders").await
    }

    /// List every registered user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, AdminApiError> {
        self.list("users").await
    }

    /// Role of the user with `email`.
    ///
    /// Any failure (unknown user, backend down, odd body) is logged and
    /// reported as `None`, which callers treat as "not an admin".
    #[instrument(skip(self), fields(email = %email))]
    pub async fn user_role(&self, email: &Email) -> Option<UserRole> {
        let request = match self.get(&["users", "role", email.as_str()]) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Could not build role lookup");
                return None;
            }
        };
        match self.execute::<RoleResponse>(request).await {
            Ok(response) => response.role,
            Err(e) => {
                warn!(error = %e, "Role lookup failed");
                None
            }
        }
    }
}
