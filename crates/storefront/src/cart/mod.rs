//! Shopping cart: the ledger, where it is stored, and the shared store
//! that ties the two together.

mod ledger;
mod storage;
mod store;

pub use ledger::CartLedger;
pub use storage::{CART_KEY, CartStorage, LocalStorage, MemoryStorage, StorageError};
pub use store::{CartEvent, CartStore};
