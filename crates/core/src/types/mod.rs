//! Core types for Robe.
//!
//! This module provides type-safe wrappers for the storefront's domain
//! concepts and the JSON records exchanged with the backend.

pub mod cart;
pub mod coupon;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod status;

pub use cart::CartLine;
pub use coupon::{Coupon, CouponCode, CouponCodeError, CouponVerification, NewCoupon};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Customer, CustomerError, Order, OrderDraft};
pub use price::{Price, PriceError};
pub use product::{Category, Gender, Product, Swatch, UnknownLabel};
pub use status::*;
