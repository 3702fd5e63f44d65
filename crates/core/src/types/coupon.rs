//! Coupon types.
//!
//! Coupons are server-owned fixed-amount discounts tied to a user. The
//! storefront only submits a code for verification and applies whatever
//! amount the backend returns.

use core::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::CouponId;
use super::price::Price;

/// Errors that can occur when parsing a [`CouponCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CouponCodeError {
    #[error("coupon code cannot be empty")]
    Empty,
    #[error("coupon code cannot contain whitespace")]
    Whitespace,
    #[error("coupon code must be at most {max} characters")]
    TooLong { max: usize },
}

/// A coupon code, trimmed and normalized to upper case.
///
/// ```
/// use robe_core::CouponCode;
///
/// let code = CouponCode::parse("  eid50 ").unwrap();
/// assert_eq!(code.as_str(), "EID50");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponCode(String);

impl CouponCode {
    pub const MAX_LENGTH: usize = 64;

    /// Parse and normalize a code.
    ///
    /// # Errors
    ///
    /// Returns an error for empty input, inner whitespace or overly long codes.
    pub fn parse(s: &str) -> Result<Self, CouponCodeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CouponCodeError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(CouponCodeError::Whitespace);
        }
        if s.chars().count() > Self::MAX_LENGTH {
            return Err(CouponCodeError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(s.to_uppercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CouponCode {
    type Err = CouponCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A coupon record as listed in the admin console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(rename = "_id")]
    pub id: CouponId,
    pub code: String,
    /// Fixed discount amount (not a percentage).
    pub discount: Price,
    pub user_email: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Backend answer to a coupon verification request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponVerification {
    pub valid: bool,
    #[serde(default)]
    pub discount_amount: Price,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a coupon creation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCoupon {
    pub user_email: Email,
    pub code: CouponCode,
    pub discount: Price,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_code_normalization() {
        assert_eq!(CouponCode::parse("winter10").unwrap().as_str(), "WINTER10");
        assert_eq!(CouponCode::parse("  "), Err(CouponCodeError::Empty));
        assert_eq!(CouponCode::parse("two words"), Err(CouponCodeError::Whitespace));
        assert!(matches!(
            CouponCode::parse(&"x".repeat(65)),
            Err(CouponCodeError::TooLong { .. })
        ));
    }

    #[test]
    fn test_verification_invalid_without_amount() {
        let v: CouponVerification =
            serde_json::from_str(r#"{"valid":false,"message":"Coupon expired"}"#).unwrap();
        assert!(!v.valid);
        assert!(v.discount_amount.is_zero());
        assert_eq!(v.message.as_deref(), Some("Coupon expired"));
    }

    #[test]
    fn test_coupon_wire_names() {
        let coupon: Coupon = serde_json::from_str(
            r#"{"_id":"c1","code":"EID50","discount":"50","userEmail":"a@b.co","createdAt":"2025-03-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(coupon.discount, Price::from_taka(50));
        assert!(coupon.created_at.is_some());
    }
}
