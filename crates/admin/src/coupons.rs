//! Coupon creation form.

use robe_core::{CouponCode, Email, NewCoupon};

use crate::products::{FormError, parse_positive_price};

/// The "add coupon" form as typed by an admin.
#[derive(Debug, Clone, Default)]
pub struct CouponForm {
    pub user_email: String,
    pub code: String,
    /// Fixed discount amount in Taka.
    pub discount: String,
}

impl CouponForm {
    /// Validate and normalize (the code is upper-cased).
    ///
    /// # Errors
    ///
    /// Returns an error for a bad email, a malformed code or a discount
    /// that is not a positive amount.
    pub fn validate(&self) -> Result<NewCoupon, FormError> {
        let user_email = Email::parse(&self.user_email)?;
        let code = CouponCode::parse(&self.code)?;
        let discount = parse_positive_price(&self.discount).map_err(|e| match e {
            FormError::InvalidPrice(raw) if raw.parse::<f64>().is_ok_and(|v| v <= 0.0) => {
                FormError::NonPositiveDiscount
            }
            other => other,
        })?;
        Ok(NewCoupon {
            user_email,
            code,
            discount,
        })
    }
}
