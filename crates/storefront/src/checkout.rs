//! Checkout: coupon handling, order totals and the single order submission.
//!
//! The discount always comes from the backend; nothing here decides what a
//! coupon is worth. Totals follow
//! `total = max(subtotal - discount, 0) + shipping_fee`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use robe_core::{CouponCode, CouponCodeError, Customer, CustomerError, OrderDraft, OrderId, Price};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{ApiError, OrderReceipt, StorefrontClient};
use crate::cart::CartStore;
use crate::notice::Notice;

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Errors surfaced by checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("no coupon code entered")]
    EmptyCouponCode,

    #[error("invalid coupon: {0}")]
    InvalidCoupon(String),

    #[error("cart is empty")]
    EmptyCart,

    #[error("invalid customer details: {0}")]
    InvalidCustomer(#[from] CustomerError),

    #[error("an order is already being submitted")]
    AlreadySubmitting,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CheckoutError {
    /// Message to show the user.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::EmptyCouponCode => Notice::error("Please enter a coupon code"),
            Self::InvalidCoupon(message) => Notice::error(message.clone()),
            Self::EmptyCart => Notice::error("Your cart is empty"),
            Self::InvalidCustomer(e) => Notice::error(format!("Please check your details: {e}")),
            Self::AlreadySubmitting => Notice::info("Your order is already being placed"),
            Self::Api(_) => Notice::error(GENERIC_FAILURE),
        }
    }
}

/// Money breakdown shown on the checkout page and sent with the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSummary {
    pub subtotal: Price,
    pub discount: Price,
    pub shipping_fee: Price,
    pub total: Price,
}

impl OrderSummary {
    #[must_use]
    pub fn compute(subtotal: Price, discount: Price, shipping_fee: Price) -> Self {
        Self {
            subtotal,
            discount,
            shipping_fee,
            total: subtotal.saturating_sub(discount) + shipping_fee,
        }
    }
}

/// A coupon the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCoupon {
    pub code: CouponCode,
    pub discount: Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    Submitting,
}

/// How the last submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Succeeded { order_id: Option<OrderId> },
    Failed { message: String },
}

#[derive(Debug, Default)]
struct Session {
    coupon: Option<AppliedCoupon>,
    state: CheckoutState,
    last_outcome: Option<CheckoutOutcome>,
}

/// One checkout session over the shared cart.
///
/// `Idle -> Submitting -> Idle`. A successful submission clears the cart and
/// the coupon; a failed one keeps both so the user can resubmit. There is no
/// automatic retry.
pub struct Checkout {
    client: StorefrontClient,
    cart: CartStore,
    shipping_fee: Price,
    session: Mutex<Session>,
}

/// Puts the session back to `Idle` even if the submit future is dropped.
struct SubmittingGuard<'a>(&'a Checkout);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.session().state = CheckoutState::Idle;
    }
}

impl Checkout {
    #[must_use]
    pub fn new(client: StorefrontClient, cart: CartStore, shipping_fee: Price) -> Self {
        Self {
            client,
            cart,
            shipping_fee,
            session: Mutex::new(Session::default()),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn state(&self) -> CheckoutState {
        self.session().state
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<CheckoutOutcome> {
        self.session().last_outcome.clone()
    }

    #[must_use]
    pub fn coupon(&self) -> Option<AppliedCoupon> {
        self.session().coupon.clone()
    }

    /// Verify `raw` with the backend and, if valid, apply its discount.
    ///
    /// # Errors
    ///
    /// `EmptyCouponCode` without contacting the backend for blank input,
    /// `InvalidCoupon` when the backend rejects the code, `Api` otherwise.
    #[instrument(skip(self))]
    pub async fn apply_coupon(&self, raw: &str) -> Result<AppliedCoupon, CheckoutError> {
        let code = CouponCode::parse(raw).map_err(|e| match e {
            CouponCodeError::Empty => CheckoutError::EmptyCouponCode,
            other => CheckoutError::InvalidCoupon(other.to_string()),
        })?;

        let verdict = self.client.verify_coupon(&code).await?;
        if !verdict.valid {
            let message = verdict
                .message
                .unwrap_or_else(|| "Invalid coupon code".to_string());
            info!(%code, %message, "Coupon rejected");
            return Err(CheckoutError::InvalidCoupon(message));
        }

        let applied = AppliedCoupon {
            code,
            discount: verdict.discount_amount,
        };
        info!(code = %applied.code, discount = %applied.discount, "Coupon applied");
        self.session().coupon = Some(applied.clone());
        Ok(applied)
    }

    pub fn clear_coupon(&self) {
        self.session().coupon = None;
    }

    /// Totals for the current cart and coupon.
    #[must_use]
    pub fn summary(&self) -> OrderSummary {
        let discount = self
            .session()
            .coupon
            .as_ref()
            .map_or(Price::ZERO, |c| c.discount);
        OrderSummary::compute(self.cart.subtotal(), discount, self.shipping_fee)
    }

    /// Build the order payload for `customer`.
    ///
    /// # Errors
    ///
    /// `EmptyCart` or `InvalidCustomer`.
    pub fn draft(&self, customer: Customer) -> Result<OrderDraft, CheckoutError> {
        let coupon = self.session().coupon.clone();
        Self::build_draft(&self.cart, self.shipping_fee, coupon, customer)
    }

    fn build_draft(
        cart: &CartStore,
        shipping_fee: Price,
        coupon: Option<AppliedCoupon>,
        customer: Customer,
    ) -> Result<OrderDraft, CheckoutError> {
        let ledger = cart.snapshot();
        if ledger.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        customer.validate()?;

        let discount = coupon.as_ref().map_or(Price::ZERO, |c| c.discount);
        let summary = OrderSummary::compute(ledger.subtotal(), discount, shipping_fee);
        Ok(OrderDraft {
            customer,
            items: ledger.lines().to_vec(),
            subtotal: summary.subtotal,
            discount: summary.discount,
            shipping_fee: summary.shipping_fee,
            total_amount: summary.total,
            coupon_applied: coupon.map(|c| c.code),
            created_at: Utc::now(),
        })
    }

    /// Post the order once.
    ///
    /// # Errors
    ///
    /// `AlreadySubmitting` while another submission is in flight; `EmptyCart`
    /// and `InvalidCustomer` before any request is made; `Api` when the
    /// backend call fails, in which case the cart is left untouched.
    #[instrument(skip(self, customer))]
    pub async fn submit(&self, customer: Customer) -> Result<OrderReceipt, CheckoutError> {
        let draft = {
            let mut session = self.session();
            if session.state == CheckoutState::Submitting {
                return Err(CheckoutError::AlreadySubmitting);
            }
            let draft =
                Self::build_draft(&self.cart, self.shipping_fee, session.coupon.clone(), customer)?;
            session.state = CheckoutState::Submitting;
            draft
        };
        let _guard = SubmittingGuard(self);

        match self.client.create_order(&draft).await {
            Ok(receipt) => {
                info!(order_id = ?receipt.order_id, total = %draft.total_amount, "Order placed");
                self.cart.clear();
                let mut session = self.session();
                session.coupon = None;
                session.last_outcome = Some(CheckoutOutcome::Succeeded {
                    order_id: receipt.order_id.clone(),
                });
                Ok(receipt)
            }
            Err(e) => {
                warn!(error = %e, "Order submission failed, cart kept");
                self.session().last_outcome = Some(CheckoutOutcome::Failed {
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use robe_core::{PaymentMethod, Product, ProductId};

    use super::*;
    use crate::cart::MemoryStorage;
    use crate::config::StorefrontConfig;

    // Nothing listens here; any request would fail.
    fn offline_checkout(shipping: u32) -> Checkout {
        let config = StorefrontConfig::from_lookup(|key| {
            (key == "ROBE_API_URL").then(|| "http://127.0.0.1:9".to_string())
        })
        .unwrap();
        let client = StorefrontClient::new(&config).unwrap();
        let cart = CartStore::open(Arc::new(MemoryStorage::new()));
        Checkout::new(client, cart, Price::from_taka(shipping))
    }

    fn product(price: u32) -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Panjabi".into(),
            price: Price::from_taka(price),
            category: "panjabi".into(),
            gender: None,
            color: None,
            image: String::new(),
            description: String::new(),
        }
    }

    fn customer() -> Customer {
        Customer {
            email: "buyer@example.com".into(),
            first_name: "Rafi".into(),
            last_name: "Hasan".into(),
            mobile: "01711111111".into(),
            address: "12 Lake Road, Dhaka".into(),
            payment_method: PaymentMethod::CashOnDelivery,
        }
    }

    #[test]
    fn test_summary_scenarios() {
        let s = OrderSummary::compute(Price::from_taka(1000), Price::from_taka(300), Price::ZERO);
        assert_eq!(s.total, Price::from_taka(700));

        let s = OrderSummary::compute(Price::from_taka(1000), Price::from_taka(1500), Price::ZERO);
        assert_eq!(s.total, Price::ZERO);

        let s = OrderSummary::compute(Price::from_taka(1000), Price::from_taka(1500), Price::from_taka(60));
        assert_eq!(s.total, Price::from_taka(60));
    }

    #[test]
    fn test_summary_uses_cart_and_coupon() {
        let checkout = offline_checkout(80);
        checkout.cart.add(&product(500), 2);
        checkout.session().coupon = Some(AppliedCoupon {
            code: CouponCode::parse("save300").unwrap(),
            discount: Price::from_taka(300),
        });

        let summary = checkout.summary();
        assert_eq!(summary.subtotal, Price::from_taka(1000));
        assert_eq!(summary.total, Price::from_taka(780));

        let draft = checkout.draft(customer()).unwrap();
        assert_eq!(draft.total_amount, Price::from_taka(780));
        assert_eq!(draft.coupon_applied.unwrap().as_str(), "SAVE300");
        assert_eq!(draft.items.len(), 1);

        checkout.clear_coupon();
        assert_eq!(checkout.summary().total, Price::from_taka(1080));
    }

    #[tokio::test]
    async fn test_blank_coupon_rejected_locally() {
        let checkout = offline_checkout(0);
        let err = checkout.apply_coupon("   ").await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCouponCode));
        assert!(checkout.coupon().is_none());
    }

    #[tokio::test]
    async fn test_empty_cart_rejected_before_request() {
        let checkout = offline_checkout(0);
        let err = checkout.submit(customer()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(err.notice().message, "Your cart is empty");
        assert_eq!(checkout.state(), CheckoutState::Idle);
        assert!(checkout.last_outcome().is_none());
    }

    #[tokio::test]
    async fn test_invalid_customer_rejected_before_request() {
        let checkout = offline_checkout(0);
        checkout.cart.add(&product(500), 1);
        let mut who = customer();
        who.mobile = String::new();
        let err = checkout.submit(who).await.unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidCustomer(_)));
        assert_eq!(checkout.cart.item_count(), 1);
    }

    #[tokio::test]
    async fn test_second_submit_while_submitting() {
        let checkout = offline_checkout(0);
        checkout.cart.add(&product(500), 1);
        checkout.session().state = CheckoutState::Submitting;
        let err = checkout.submit(customer()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::AlreadySubmitting));
    }

    #[tokio::test]
    async fn test_unreachable_backend_keeps_cart() {
        let checkout = offline_checkout(0);
        checkout.cart.add(&product(500), 2);
        let err = checkout.submit(customer()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Api(_)));
        assert_eq!(err.notice().message, GENERIC_FAILURE);
        assert_eq!(checkout.cart.item_count(), 2);
        assert_eq!(checkout.state(), CheckoutState::Idle);
        assert!(matches!(checkout.last_outcome(), Some(CheckoutOutcome::Failed { .. })));
    }
}
