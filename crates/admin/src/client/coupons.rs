//! Coupon management.

use robe_core::{Coupon, CouponId, NewCoupon};
use robe_core::wire::inserted_id;
use tracing::{info, instrument};

use super::{AdminApiError, AdminClient};

impl AdminClient {
    /// List every coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self))]
    pub async fn list_coupons(&self) -> Result<Vec<Coupon>, AdminApiError> {
        self.list("coupons").await
    }

    /// Create a coupon for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, coupon), fields(code = %coupon.code, user = %coupon.user_email))]
    pub async fn create_coupon(&self, coupon: &NewCoupon) -> Result<Option<CouponId>, AdminApiError> {
        let body = self.send(self.post(&["coupons"])?.json(coupon)).await?;
        let id = inserted_id(&body).map(CouponId::from);
        info!(coupon_id = ?id, "Coupon created");
        Ok(id)
    }

    /// Delete a coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self), fields(coupon_id = %id))]
    pub async fn delete_coupon(&self, id: &CouponId) -> Result<(), AdminApiError> {
        self.send(self.delete(&["coupons", id.as_str()])?).await?;
        info!("Coupon deleted");
        Ok(())
    }
}
