//! Robe CLI - browse the shop, manage the cart, check out and run the
//! admin console from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse women's bags under Tk 1000, cheapest first
//! robe shop --gender women --category bag --price p1 --sort price-asc
//!
//! # Add two units of a product and check out with a coupon
//! robe cart add 66f0c1 --qty 2
//! robe checkout --email a@b.co --first-name Nadia --last-name Rahman \
//!     --mobile 01700000000 --address "House 4, Dhanmondi" --coupon EID50
//!
//! # Admin: list orders with dashboard figures
//! robe admin --as admin@robe.shop orders
//!
//! # Bulk-create products from a YAML file
//! robe seed products.yaml --as admin@robe.shop
//! ```
//!
//! # Commands
//!
//! - `shop` / `collection` / `product` - Browse the catalog
//! - `cart` - Show and change the local cart
//! - `checkout` - Place a cash-on-delivery order
//! - `admin` - Product, coupon, order and user management (admins only)
//! - `seed` - Create products in bulk

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use robe_core::{Category, Customer, Gender, PaymentMethod, ProductId, Swatch};
use robe_storefront::catalog::{CatalogQuery, PriceBracket, SortKey};
use robe_storefront::config::StorefrontConfig;
use robe_storefront::error::AppError;
use robe_storefront::{Storefront, pager};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "robe")]
#[command(author, version, about = "Robe shop from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog with filters
    Shop {
        /// men or women
        #[arg(long)]
        gender: Option<Gender>,

        /// Price bracket p1..p7 (p1 = up to Tk 1000, p7 = above Tk 5000)
        #[arg(long)]
        price: Option<PriceBracket>,

        /// Color swatch (black, white, red, ...)
        #[arg(long)]
        color: Option<Swatch>,

        /// Category label, matched case-insensitively
        #[arg(long)]
        category: Option<String>,

        /// featured, price-asc or price-desc
        #[arg(long, default_value = "featured")]
        sort: SortKey,

        /// Products per page (12, 24 or 48)
        #[arg(long, default_value_t = pager::SHOP_PAGE_SIZES[0])]
        per_page: usize,

        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Browse a single category
    Collection {
        category: Category,

        #[arg(long, default_value = "featured")]
        sort: SortKey,

        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one product
    Product { id: String },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the current cart (cash on delivery)
    Checkout {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        mobile: String,
        #[arg(long)]
        address: String,
        /// Coupon code to verify and apply before ordering
        #[arg(long)]
        coupon: Option<String>,
    },
    /// Admin console (requires the admin role)
    Admin {
        /// Email of the signed-in admin
        #[arg(long = "as", value_name = "EMAIL")]
        identity: String,

        #[command(subcommand)]
        action: AdminAction,
    },
    /// Create products in bulk from a YAML file
    Seed {
        /// Path to the YAML file
        file: PathBuf,

        /// Email of the signed-in admin
        #[arg(long = "as", value_name = "EMAIL")]
        identity: String,

        /// Validate the file without creating anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart lines and totals
    Show,
    /// Add a product (increments an existing line)
    Add {
        product_id: String,
        #[arg(long, default_value_t = 1)]
        qty: u32,
    },
    /// Overwrite a line's quantity
    Set { product_id: String, qty: u32 },
    /// Remove a line
    Remove { product_id: String },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AdminAction {
    /// List products
    Products,
    /// Create a product
    AddProduct {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// Image file to upload
        #[arg(long, conflicts_with = "image_url")]
        image: Option<PathBuf>,
        /// Already hosted image URL
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Edit a product's name, price, category or image
    EditProduct {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, conflicts_with = "image_url")]
        image: Option<PathBuf>,
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Delete a product
    DeleteProduct { id: String },
    /// List coupons
    Coupons,
    /// Create a coupon for a user
    AddCoupon {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
        /// Fixed discount amount in Taka
        #[arg(long)]
        discount: String,
    },
    /// Delete a coupon
    DeleteCoupon { id: String },
    /// List orders with dashboard figures
    Orders,
    /// List users
    Users,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            send_default_pii: false,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[error] {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr; stdout is command output.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "robe_storefront=info,robe_admin=info,robe_cli=info".into());

    let json_logs = std::env::var("ROBE_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, config).await {
        eprintln!("[error] {}", e.report());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CommandError> {
    match cli.command {
        Commands::Shop {
            gender,
            price,
            color,
            category,
            sort,
            per_page,
            page,
        } => {
            let query = CatalogQuery::new()
                .gender(gender)
                .price(price)
                .color(color)
                .category(category)
                .sort(sort);
            commands::shop::browse(&open_store(config)?, &query, per_page, page).await?;
        }
        Commands::Collection {
            category,
            sort,
            page,
        } => commands::shop::collection(&open_store(config)?, category, sort, page).await?,
        Commands::Product { id } => {
            commands::shop::product(&open_store(config)?, &ProductId::new(id)).await?;
        }
        Commands::Cart { action } => commands::cart::run(&open_store(config)?, action).await?,
        Commands::Checkout {
            email,
            first_name,
            last_name,
            mobile,
            address,
            coupon,
        } => {
            let customer = Customer {
                email,
                first_name,
                last_name,
                mobile,
                address,
                payment_method: PaymentMethod::CashOnDelivery,
            };
            commands::checkout::run(&open_store(config)?, customer, coupon.as_deref()).await?;
        }
        Commands::Admin { identity, action } => commands::admin::run(&identity, action).await?,
        Commands::Seed {
            file,
            identity,
            dry_run,
        } => commands::seed::products(&file, &identity, dry_run).await?,
    }
    Ok(())
}

fn open_store(config: StorefrontConfig) -> Result<Storefront, AppError> {
    Ok(Storefront::new(config)?)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_shop_filters() {
        let cli = Cli::try_parse_from([
            "robe", "shop", "--gender", "Women", "--price", "p3", "--color", "navy", "--sort",
            "price-desc",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        let Commands::Shop {
            gender,
            price,
            color,
            sort,
            per_page,
            ..
        } = cli.command
        else {
            panic!("expected shop");
        };
        assert_eq!(gender, Some(Gender::Women));
        assert_eq!(price, Some(PriceBracket::To2000));
        assert_eq!(color, Some(Swatch::Navy));
        assert_eq!(sort, SortKey::PriceDesc);
        assert_eq!(per_page, 12);
    }

    #[test]
    fn test_rejects_unknown_color() {
        assert!(Cli::try_parse_from(["robe", "shop", "--color", "teal"]).is_err());
    }

    #[test]
    fn test_admin_requires_identity() {
        assert!(Cli::try_parse_from(["robe", "admin", "orders"]).is_err());
        assert!(Cli::try_parse_from(["robe", "admin", "--as", "a@b.co", "orders"]).is_ok());
    }
}
