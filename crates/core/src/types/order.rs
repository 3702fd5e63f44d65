//! Order types.
//!
//! [`OrderDraft`] is what the storefront submits at checkout; [`Order`] is
//! the server-owned record listed in the admin console.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cart::CartLine;
use super::coupon::CouponCode;
use super::email::{Email, EmailError};
use super::id::OrderId;
use super::price::Price;
use super::status::PaymentMethod;

/// Problems with the customer contact form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CustomerError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Customer contact and delivery details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    pub address: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl Customer {
    /// Check every required field is filled in and the email is well formed.
    ///
    /// # Errors
    ///
    /// Returns the first missing field or the email parse error.
    pub fn validate(&self) -> Result<(), CustomerError> {
        Email::parse(&self.email)?;
        for (name, value) in [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("mobile", &self.mobile),
            ("address", &self.address),
        ] {
            if value.trim().is_empty() {
                return Err(CustomerError::MissingField(name));
            }
        }
        Ok(())
    }

    /// "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Order payload submitted once per checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub customer: Customer,
    pub items: Vec<CartLine>,
    pub subtotal: Price,
    pub discount: Price,
    pub shipping_fee: Price,
    pub total_amount: Price,
    pub coupon_applied: Option<CouponCode>,
    pub created_at: DateTime<Utc>,
}

/// A placed order as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub customer: Customer,
    #[serde(default)]
    pub items: Vec<CartLine>,
    pub subtotal: Price,
    #[serde(default)]
    pub discount: Price,
    #[serde(default)]
    pub shipping_fee: Price,
    #[serde(default)]
    pub total_amount: Option<Price>,
    #[serde(default)]
    pub coupon_applied: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Amount charged, recomputed from the parts for records that predate
    /// `totalAmount`.
    #[must_use]
    pub fn total(&self) -> Price {
        self.total_amount
            .unwrap_or_else(|| self.subtotal.saturating_sub(self.discount) + self.shipping_fee)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn customer() -> Customer {
        Customer {
            email: "buyer@example.com".into(),
            first_name: "Nadia".into(),
            last_name: "Rahman".into(),
            mobile: "01700000000".into(),
            address: "House 4, Road 2, Dhanmondi".into(),
            payment_method: PaymentMethod::CashOnDelivery,
        }
    }

    #[test]
    fn test_customer_validate() {
        assert!(customer().validate().is_ok());

        let mut missing = customer();
        missing.address = "  ".into();
        assert_eq!(missing.validate(), Err(CustomerError::MissingField("address")));

        let mut bad_email = customer();
        bad_email.email = "nadia".into();
        assert!(matches!(bad_email.validate(), Err(CustomerError::InvalidEmail(_))));
    }

    #[test]
    fn test_customer_wire_names() {
        let json = serde_json::to_value(customer()).unwrap();
        assert_eq!(json["firstName"], "Nadia");
        assert_eq!(json["paymentMethod"], "Cash On Delivery");
    }

    #[test]
    fn test_legacy_order_total() {
        let order: Order = serde_json::from_str(
            r#"{"_id":"o1","customer":{"email":"a@b.co","firstName":"A","lastName":"B","mobile":"1","address":"x"},
                "items":[{"_id":"p1","name":"Bag","price":500,"quantity":2}],
                "subtotal":1000,"discount":300}"#,
        )
        .unwrap();
        assert_eq!(order.total(), Price::from_taka(700));
        assert_eq!(order.unit_count(), 2);
    }

    #[test]
    fn test_unit_count_saturates() {
        let order: Order = serde_json::from_str(&format!(
            r#"{{"_id":"o2","customer":{{"email":"a@b.co","firstName":"A","lastName":"B","mobile":"1","address":"x"}},
                "items":[{{"_id":"p1","name":"Bag","price":1,"quantity":{max}}},
                         {{"_id":"p2","name":"Hat","price":1,"quantity":5}}],
                "subtotal":0}}"#,
            max = u32::MAX
        ))
        .unwrap();
        assert_eq!(order.unit_count(), u32::MAX);
    }
}
