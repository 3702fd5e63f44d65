//! Shared cart store with change notifications.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use robe_core::{CartLine, Price, Product, ProductId};
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

use super::CartLedger;
use super::storage::{CartStorage, StorageError};

const EVENT_CAPACITY: usize = 64;

/// Change notification sent after every cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    Added { product_id: ProductId, quantity: u32 },
    QuantityChanged { product_id: ProductId, quantity: u32 },
    Removed { product_id: ProductId },
    Cleared,
    /// The in-memory cart was reloaded from storage.
    Resynced,
}

/// The cart shared by every view of the storefront.
///
/// Owns the [`CartLedger`], writes it to storage after each mutation and
/// broadcasts a [`CartEvent`] to subscribers. Storage failures are logged
/// and otherwise ignored; the in-memory cart stays authoritative.
///
/// Cheap to clone; clones share the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    ledger: Mutex<CartLedger>,
    storage: Arc<dyn CartStorage>,
    events: broadcast::Sender<CartEvent>,
}

impl CartStore {
    /// Open the store, loading whatever cart `storage` holds.
    ///
    /// An unreadable stored cart is logged and replaced by an empty one.
    pub fn open(storage: Arc<dyn CartStorage>) -> Self {
        let ledger = storage.load().unwrap_or_else(|e| {
            warn!(error = %e, "Stored cart unreadable, starting empty");
            CartLedger::new()
        });
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(CartStoreInner {
                ledger: Mutex::new(ledger),
                storage,
                events,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CartLedger> {
        self.inner
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, ledger: &CartLedger) {
        if let Err(e) = self.inner.storage.save(ledger) {
            warn!(error = %e, "Failed to persist cart");
        }
    }

    fn notify(&self, event: CartEvent) {
        // Sending only fails when nobody is subscribed.
        let _ = self.inner.events.send(event);
    }

    /// Receive a [`CartEvent`] after every mutation from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.inner.events.subscribe()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of `product`. Returns the line's new quantity.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add(&self, product: &Product, quantity: u32) -> u32 {
        let total = {
            let mut ledger = self.lock();
            let total = ledger.add_or_increment(product, quantity);
            self.persist(&ledger);
            total
        };
        debug!(quantity = total, "Added to cart");
        self.notify(CartEvent::Added {
            product_id: product.id.clone(),
            quantity: total,
        });
        total
    }

    /// Overwrite a line's quantity.
    ///
    /// Only an actual change is persisted and broadcast. A quantity below 1,
    /// an unknown id or the line's current quantity is a no-op that returns
    /// `false` and leaves storage untouched.
    #[instrument(skip(self))]
    pub fn set_quantity(&self, product_id: &ProductId, quantity: u32) -> bool {
        let changed = {
            let mut ledger = self.lock();
            let changed = ledger.set_quantity(product_id, quantity);
            if changed {
                self.persist(&ledger);
            }
            changed
        };
        if changed {
            self.notify(CartEvent::QuantityChanged {
                product_id: product_id.clone(),
                quantity,
            });
        }
        changed
    }

    #[instrument(skip(self))]
    pub fn remove(&self, product_id: &ProductId) -> Option<CartLine> {
        let removed = {
            let mut ledger = self.lock();
            let removed = ledger.remove(product_id);
            if removed.is_some() {
                self.persist(&ledger);
            }
            removed
        };
        if removed.is_some() {
            self.notify(CartEvent::Removed {
                product_id: product_id.clone(),
            });
        }
        removed
    }

    #[instrument(skip(self))]
    pub fn clear(&self) {
        {
            let mut ledger = self.lock();
            ledger.clear();
            self.persist(&ledger);
        }
        self.notify(CartEvent::Cleared);
    }

    /// Replace the in-memory cart with what storage currently holds.
    ///
    /// # Errors
    ///
    /// Returns the storage error and keeps the current cart if the stored
    /// value cannot be read.
    #[instrument(skip(self))]
    pub fn resync(&self) -> Result<(), StorageError> {
        let fresh = self.inner.storage.load()?;
        *self.lock() = fresh;
        self.notify(CartEvent::Resynced);
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> CartLedger {
        self.lock().clone()
    }

    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lock().subtotal()
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lock().item_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
