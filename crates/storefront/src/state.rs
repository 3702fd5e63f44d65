//! Storefront state shared across commands.

use std::sync::Arc;

use crate::api::{ApiError, StorefrontClient};
use crate::cart::{CartStore, LocalStorage};
use crate::checkout::Checkout;
use crate::config::StorefrontConfig;

/// Everything a storefront view needs: configuration, the backend client
/// and the shared cart.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    client: StorefrontClient,
    cart: CartStore,
}

impl Storefront {
    /// Build the client and open the cart in the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let client = StorefrontClient::new(&config)?;
        let cart = CartStore::open(Arc::new(LocalStorage::new(config.local_storage_path())));
        Ok(Self::from_parts(config, client, cart))
    }

    /// Assemble from already constructed parts.
    #[must_use]
    pub fn from_parts(config: StorefrontConfig, client: StorefrontClient, cart: CartStore) -> Self {
        Self {
            inner: Arc::new(StorefrontInner {
                config,
                client,
                cart,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn client(&self) -> &StorefrontClient {
        &self.inner.client
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Start a checkout session over the shared cart.
    #[must_use]
    pub fn checkout(&self) -> Checkout {
        Checkout::new(
            self.inner.client.clone(),
            self.inner.cart.clone(),
            self.inner.config.shipping_fee,
        )
    }
}
