//! Subcommand implementations.

pub mod admin;
pub mod cart;
pub mod checkout;
pub mod seed;
pub mod shop;

use robe_admin::AdminError;
use robe_storefront::error::AppError;
use thiserror::Error;

/// Failure of any subcommand.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Storefront(#[from] AppError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error(transparent)]
    Seed(#[from] seed::SeedError),
}

impl CommandError {
    /// Report to Sentry where warranted and return the line to print.
    pub fn report(&self) -> String {
        match self {
            Self::Storefront(e) => e.report().message,
            Self::Admin(e) => e.report(),
            Self::Seed(e) => e.to_string(),
        }
    }
}
