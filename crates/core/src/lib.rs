//! Robe Core - Shared domain types.
//!
//! This crate provides the types used across all Robe components:
//! - `storefront` - Catalog browsing, cart and checkout
//! - `admin` - Product, coupon and order management
//! - `cli` - Terminal front-end for both
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no
//! filesystem access, no HTTP clients. This keeps it lightweight and allows
//! it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices and emails plus the
//!   product, cart, coupon and order records exchanged with the backend
//! - [`wire`] - The backend's JSON envelope and endpoint conventions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod wire;

pub use types::*;
