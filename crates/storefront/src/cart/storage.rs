//! Cart persistence backends.
//!
//! [`LocalStorage`] mirrors a browser's `localStorage`: a flat map of string
//! keys to string values, kept on disk as a single JSON object. The cart is
//! stored as a JSON-encoded string under [`CART_KEY`].

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use super::CartLedger;

/// Storage key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// Errors raised by cart storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt stored value: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Somewhere a cart can be saved and loaded from.
pub trait CartStorage: Send + Sync {
    /// Load the stored cart. A missing cart is an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or holds a corrupt value.
    fn load(&self) -> Result<CartLedger, StorageError>;

    /// Replace the stored cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn save(&self, ledger: &CartLedger) -> Result<(), StorageError>;
}

// =============================================================================
// LocalStorage
// =============================================================================

/// File-backed string key/value store.
///
/// Every write re-reads the file, so keys written by other processes
/// survive (last write wins per key).
#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Current items as the base for a write. An unparseable file is
    /// discarded so a single bad write cannot block every later one.
    fn read_for_write(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.read_all() {
            Err(StorageError::Json(e)) => {
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable local storage");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write_items(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
                parent
            }
            None => Path::new("."),
        };
        let raw = serde_json::to_string_pretty(items)?;
        // Readers only ever see a complete file.
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(raw.as_bytes()).map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }

    /// Value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn set_item(&self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        let mut items = self.read_for_write()?;
        items.insert(key.to_string(), value.into());
        self.write_items(&items)
    }

    /// Delete `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.read_for_write()?;
        if items.remove(key).is_some() {
            self.write_items(&items)?;
        }
        Ok(())
    }
}

impl CartStorage for LocalStorage {
    fn load(&self) -> Result<CartLedger, StorageError> {
        let Some(raw) = self.get_item(CART_KEY)? else {
            return Ok(CartLedger::new());
        };
        let lines = serde_json::from_str(&raw)?;
        Ok(CartLedger::from_lines(lines))
    }

    fn save(&self, ledger: &CartLedger) -> Result<(), StorageError> {
        let raw = serde_json::to_string(ledger)?;
        debug!(path = %self.path.display(), lines = ledger.len(), "Saving cart");
        self.set_item(CART_KEY, raw)
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-process storage, mainly for tests. Can be told to fail writes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    cart: Option<String>,
    fail_writes: bool,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_writes = fail;
    }

    /// Raw stored cart value, if any.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cart
            .clone()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<CartLedger, StorageError> {
        match self.raw() {
            Some(raw) => Ok(CartLedger::from_lines(serde_json::from_str(&raw)?)),
            None => Ok(CartLedger::new()),
        }
    }

    fn save(&self, ledger: &CartLedger) -> Result<(), StorageError> {
        let raw = serde_json::to_string(ledger)?;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.fail_writes {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        state.cart = Some(raw);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use robe_core::{CartLine, Price, ProductId};

    use super::*;

    fn ledger() -> CartLedger {
        CartLedger::from_lines(vec![CartLine {
            product_id: ProductId::new("p1"),
            name: "Jamdani Sharee".into(),
            price: Price::from_taka(2450),
            image: String::new(),
            category: "sharee".into(),
            quantity: 2,
        }])
    }

    #[test]
    fn test_local_storage_roundtrip_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("nested/local_storage.json"));

        assert!(storage.load().unwrap().is_empty());

        storage.set_item("theme", "dark").unwrap();
        storage.save(&ledger()).unwrap();
        assert_eq!(storage.load().unwrap(), ledger());
        assert_eq!(storage.get_item("theme").unwrap().as_deref(), Some("dark"));

        // The cart is a JSON string inside the key/value object.
        let file: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(storage.path()).unwrap()).unwrap();
        assert!(file["cart"].is_string());

        storage.remove_item(CART_KEY).unwrap();
        assert!(storage.load().unwrap().is_empty());
        assert_eq!(storage.get_item("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_local_storage_reads_browser_cart_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_storage.json");
        std::fs::write(
            &path,
            r#"{"cart":"[{\"_id\":\"p9\",\"name\":\"Tote\",\"price\":\"900\",\"quantity\":3}]"}"#,
        )
        .unwrap();
        let ledger = LocalStorage::new(path).load().unwrap();
        assert_eq!(ledger.item_count(), 3);
        assert_eq!(ledger.subtotal(), Price::from_taka(2700));
    }

    #[test]
    fn test_local_storage_corrupt_cart() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("local_storage.json"));
        storage.set_item(CART_KEY, "not json").unwrap();
        assert!(matches!(storage.load(), Err(StorageError::Json(_))));
    }

    #[test]
    fn test_local_storage_write_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_storage.json");
        std::fs::write(&path, r#"{"cart": "[]", "theme""#).unwrap();
        let storage = LocalStorage::new(&path);
        assert!(matches!(storage.load(), Err(StorageError::Json(_))));

        storage.save(&ledger()).unwrap();
        assert_eq!(storage.load().unwrap(), ledger());
        storage.set_item("theme", "dark").unwrap();
        assert_eq!(storage.get_item("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_cart_survives_reopen_after_corrupt_file() {
        use std::sync::Arc;

        use robe_core::Product;

        use super::super::CartStore;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_storage.json");
        std::fs::write(&path, r#"{"cart": "[]", "theme""#).unwrap();

        let store = CartStore::open(Arc::new(LocalStorage::new(&path)));
        assert!(store.is_empty());
        let tote = Product {
            id: ProductId::new("p-tote"),
            name: "Canvas Tote".into(),
            price: Price::from_taka(900),
            category: "bag".into(),
            gender: None,
            color: None,
            image: String::new(),
            description: String::new(),
        };
        store.add(&tote, 2);

        let reopened = CartStore::open(Arc::new(LocalStorage::new(&path)));
        assert_eq!(reopened.item_count(), 2);
    }

    #[test]
    fn test_concurrent_writers_leave_a_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_storage.json");

        let writers: Vec<_> = (0..4)
            .map(|n| {
                let storage = LocalStorage::new(&path);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        storage.set_item(&format!("writer-{n}"), i.to_string()).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let raw = std::fs::read_to_string(&path).unwrap();
        let items: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert!(!items.is_empty());
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_memory_storage_can_fail_writes() {
        let storage = MemoryStorage::new();
        storage.save(&ledger()).unwrap();
        storage.set_fail_writes(true);
        assert!(matches!(
            storage.save(&CartLedger::new()),
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(storage.load().unwrap(), ledger());
    }
}
