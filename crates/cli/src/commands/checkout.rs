//! `checkout`: verify an optional coupon, then place the order.

use robe_core::Customer;
use robe_storefront::Storefront;
use robe_storefront::checkout::{CheckoutError, OrderSummary};
use robe_storefront::error::{Result, add_breadcrumb, set_sentry_user};
use robe_storefront::notice::Notice;

/// Place a cash-on-delivery order for the stored cart.
///
/// A rejected coupon stops the command before anything is ordered.
///
/// # Errors
///
/// Any [`CheckoutError`]; on a backend failure the cart is kept.
pub async fn run(store: &Storefront, customer: Customer, coupon: Option<&str>) -> Result<()> {
    if store.cart().is_empty() {
        return Err(CheckoutError::EmptyCart.into());
    }
    let checkout = store.checkout();
    set_sentry_user(&customer.email);

    if let Some(code) = coupon {
        let applied = checkout.apply_coupon(code).await?;
        println!(
            "{}",
            Notice::success(format!("Coupon {} applied: {} off", applied.code, applied.discount))
        );
    }

    print_summary(&checkout.summary());

    add_breadcrumb("checkout", "Placing order", None);
    let receipt = checkout.submit(customer).await?;
    let message = receipt.order_id.map_or_else(
        || "Order placed successfully!".to_string(),
        |id| format!("Order placed successfully! Order id: {id}"),
    );
    println!("{}", Notice::success(message));
    Ok(())
}

fn print_summary(summary: &OrderSummary) {
    println!("Subtotal: {}", summary.subtotal);
    if !summary.discount.is_zero() {
        println!("Discount: -{}", summary.discount);
    }
    println!("Shipping: {}", summary.shipping_fee);
    println!("Total:    {}", summary.total);
}
