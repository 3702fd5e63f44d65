//! Robe storefront library.
//!
//! Catalog filtering, pagination, the persisted cart and checkout against
//! the shop's REST backend. The `robe` CLI and the integration tests drive
//! everything through this crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notice;
pub mod pager;
pub mod state;

pub use state::Storefront;
