//! Admin console commands.
//!
//! Every command first confirms the `--as` identity holds the admin role.
//!
//! # Environment Variables
//!
//! - `ROBE_ADMIN_API_URL` - Backend base URL (falls back to `ROBE_API_URL`)
//! - `ROBE_ADMIN_TOKEN` - Bearer token sent with every admin request

use std::path::Path;

use chrono::Utc;
use robe_admin::config::AdminConfig;
use robe_admin::coupons::CouponForm;
use robe_admin::guard::AdminGuard;
use robe_admin::orders::{OrderStats, newest_first};
use robe_admin::products::{ImagePayload, ProductForm, ProductUpdate};
use robe_admin::AdminClient;
use robe_admin::error::Result;
use robe_core::{CouponId, ProductId};
use tracing::{info, warn};

use super::shop::render_row;
use crate::AdminAction;

/// Build a client from the environment and confirm `identity` is an admin.
///
/// # Errors
///
/// Returns config or client errors, `InvalidIdentity` or `Forbidden`.
pub async fn connect(identity: &str) -> Result<AdminClient> {
    let config = AdminConfig::from_env()?;
    let client = AdminClient::new(&config)?;
    let session = AdminGuard::authorize(&client, identity).await?;
    info!(admin = %session.email, "Admin session started");
    Ok(client)
}

/// Run an admin subcommand as `identity`.
///
/// # Errors
///
/// Returns an error when access is refused, a form is invalid or the
/// backend call fails.
#[allow(clippy::too_many_lines)]
pub async fn run(identity: &str, action: AdminAction) -> Result<()> {
    let client = connect(identity).await?;

    match action {
        AdminAction::Products => {
            let products = client.list_products().await?;
            println!("{} products", products.len());
            for product in &products {
                println!("{}", render_row(product));
            }
        }
        AdminAction::AddProduct {
            name,
            price,
            description,
            category,
            gender,
            color,
            image,
            image_url,
        } => {
            let image = match (image, image_url) {
                (Some(path), _) => upload(&client, &path).await,
                (None, url) => url,
            };
            let product = ProductForm {
                name,
                price,
                description,
                category,
                gender,
                color,
                image,
            }
            .validate()?;
            let id = client.create_product(&product).await?;
            match id {
                Some(id) => println!("[ok] Product added: {id}"),
                None => println!("[ok] Product added"),
            }
        }
        AdminAction::EditProduct {
            id,
            name,
            price,
            category,
            image,
            image_url,
        } => {
            let id = ProductId::new(id);
            let current = client.get_product(&id).await?;
            let image = match (image, image_url) {
                (Some(path), _) => Some(upload(&client, &path).await.unwrap_or_default()),
                (None, url) => url,
            };
            let update = ProductUpdate::from_product(&current).with_changes(
                name.as_deref(),
                price.as_deref(),
                category.as_deref(),
                image.as_deref(),
            )?;
            if update == ProductUpdate::from_product(&current) {
                println!("[info] Nothing to change");
                return Ok(());
            }
            client.update_product(&id, &update).await?;
            println!("[ok] Product updated");
        }
        AdminAction::DeleteProduct { id } => {
            client.delete_product(&ProductId::new(id)).await?;
            println!("[ok] Product deleted");
        }
        AdminAction::Coupons => {
            let coupons = client.list_coupons().await?;
            println!("{} coupons", coupons.len());
            for coupon in &coupons {
                println!(
                    "{:<26} {:<16} {:>10}  {}",
                    coupon.id,
                    coupon.code,
                    coupon.discount.to_string(),
                    coupon.user_email
                );
            }
        }
        AdminAction::AddCoupon {
            email,
            code,
            discount,
        } => {
            let coupon = CouponForm {
                user_email: email,
                code,
                discount,
            }
            .validate()?;
            client.create_coupon(&coupon).await?;
            println!("[ok] Coupon {} created for {}", coupon.code, coupon.user_email);
        }
        AdminAction::DeleteCoupon { id } => {
            client.delete_coupon(&CouponId::new(id)).await?;
            println!("[ok] Coupon deleted");
        }
        AdminAction::Orders => {
            let orders = client.list_orders().await?;
            let stats = OrderStats::from_orders(&orders, Utc::now());
            println!("Total orders:  {}", stats.total_orders);
            println!("Revenue:       {}", stats.revenue);
            println!("Average order: {}", stats.average_order);
            println!("This month:    {}", stats.this_month);
            println!();
            for order in newest_first(&orders) {
                let placed = order
                    .created_at
                    .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d").to_string());
                println!(
                    "{:<26} {:<10} {:<28} {:>3} items {:>10}",
                    order.id,
                    placed,
                    order.customer.full_name(),
                    order.unit_count(),
                    order.total().to_string()
                );
            }
        }
        AdminAction::Users => {
            let users = client.list_users().await?;
            println!("{} users", users.len());
            for user in &users {
                println!(
                    "{:<32} {:<24} {}",
                    user.email,
                    user.name.as_deref().unwrap_or("-"),
                    user.role
                );
            }
        }
    }
    Ok(())
}

/// Upload an image file, returning its URL. A failed upload leaves the
/// form without an image, which validation then reports.
async fn upload(client: &AdminClient, path: &Path) -> Option<String> {
    let payload = match ImagePayload::from_file(path) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Image rejected");
            eprintln!("[error] {e}");
            return None;
        }
    };
    match client.upload_image(&payload).await {
        Ok(url) => {
            info!(bytes = payload.len(), mime = payload.mime(), "Image uploaded");
            Some(url)
        }
        Err(e) => {
            warn!(error = %e, "Image upload failed");
            eprintln!("[error] Image upload failed: {e}");
            None
        }
    }
}
