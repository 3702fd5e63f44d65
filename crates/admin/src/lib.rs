//! Robe admin console library.
//!
//! Product, coupon and order management against the shop backend. Access
//! is gated by [`guard::AdminGuard`], which is a convenience check only; the
//! backend remains responsible for authorizing every admin endpoint.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod coupons;
pub mod error;
pub mod guard;
pub mod orders;
pub mod products;

pub use client::AdminClient;
pub use error::AdminError;
