//! `cart` subcommands.

use robe_core::{Price, ProductId};
use robe_storefront::Storefront;
use robe_storefront::checkout::OrderSummary;
use robe_storefront::error::{AppError, Result, add_breadcrumb};
use robe_storefront::notice::Notice;

use crate::CartAction;

/// Run a cart subcommand against the locally stored cart.
///
/// # Errors
///
/// `add` fails when the product cannot be fetched; `set` fails for a
/// quantity below 1.
pub async fn run(store: &Storefront, action: CartAction) -> Result<()> {
    let cart = store.cart();
    match action {
        CartAction::Show => show(store),
        CartAction::Add { product_id, qty } => {
            let qty = qty.max(1);
            let product = store.client().get_product(&ProductId::new(product_id)).await?;
            let quantity = cart.add(&product, qty);
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[("product_id", product.id.as_str()), ("quantity", &quantity.to_string())]),
            );
            println!("{}", Notice::success(format!("{} added to cart ({quantity} in cart)", product.name)));
        }
        CartAction::Set { product_id, qty } => {
            if qty < 1 {
                return Err(AppError::BadRequest(
                    "Quantity must be at least 1; use `robe cart remove` instead".to_string(),
                ));
            }
            let id = ProductId::new(product_id);
            if cart.snapshot().get(&id).is_none() {
                return Err(AppError::NotFound(format!("{id} is not in the cart")));
            }
            if cart.set_quantity(&id, qty) {
                println!("{}", Notice::success(format!("Quantity updated to {qty}")));
            } else {
                println!("{}", Notice::info("Quantity unchanged"));
            }
        }
        CartAction::Remove { product_id } => {
            let id = ProductId::new(product_id);
            match cart.remove(&id) {
                Some(line) => {
                    add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", id.as_str())]));
                    println!("{}", Notice::info(format!("{} removed from cart", line.name)));
                }
                None => return Err(AppError::NotFound(format!("{id} is not in the cart"))),
            }
        }
        CartAction::Clear => {
            cart.clear();
            println!("{}", Notice::info("Cart cleared"));
        }
    }
    Ok(())
}

fn show(store: &Storefront) {
    let ledger = store.cart().snapshot();
    if ledger.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in ledger.lines() {
        println!(
            "{:<26} {:<32} {:>3} x {:>10} = {:>10}",
            line.product_id,
            line.name,
            line.quantity,
            line.price.to_string(),
            line.line_total().to_string()
        );
    }

    let summary = OrderSummary::compute(ledger.subtotal(), Price::ZERO, store.config().shipping_fee);
    println!();
    println!("Items:    {}", ledger.item_count());
    println!("Subtotal: {}", summary.subtotal);
    println!("Shipping: {}", summary.shipping_fee);
    println!("Total:    {}", summary.total);
}
