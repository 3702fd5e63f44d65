//! Seed the catalog with products from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Jamdani Sharee
//!     price: 4500
//!     category: sharee
//!     gender: women
//!     color: red
//!     image: https://cdn.example.com/jamdani.jpg
//!     description: Handwoven cotton jamdani.
//! ```
//!
//! The whole file is validated before anything is created.

use std::path::{Path, PathBuf};

use robe_admin::products::{FormError, NewProduct, ProductForm};
use robe_core::Price;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

use super::CommandError;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{0} invalid products, nothing was created")]
    Invalid(usize),
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
struct SeedProduct {
    name: String,
    price: Price,
    category: String,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    description: String,
}

impl SeedProduct {
    fn validate(self) -> Result<NewProduct, FormError> {
        ProductForm {
            name: self.name,
            price: self.price.amount().to_string(),
            description: self.description,
            category: self.category,
            gender: self.gender,
            color: self.color,
            image: self.image,
        }
        .validate()
    }
}

/// A product entry that failed validation.
#[derive(Debug)]
struct Rejected {
    /// 1-based position in the file.
    position: usize,
    name: String,
    error: FormError,
}

enum Parsed {
    Valid(Vec<NewProduct>),
    Invalid(Vec<Rejected>),
}

/// Parse and validate every product in `content`.
fn parse(content: &str) -> Result<Parsed, SeedError> {
    let file: SeedFile = serde_yaml::from_str(content)?;
    let mut valid = Vec::with_capacity(file.products.len());
    let mut invalid = Vec::new();
    for (index, product) in file.products.into_iter().enumerate() {
        let name = product.name.clone();
        match product.validate() {
            Ok(product) => valid.push(product),
            Err(error) => invalid.push(Rejected {
                position: index + 1,
                name,
                error,
            }),
        }
    }
    Ok(if invalid.is_empty() {
        Parsed::Valid(valid)
    } else {
        Parsed::Invalid(invalid)
    })
}

/// Create every product listed in `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any product is
/// invalid, admin access is refused or a create request fails.
pub async fn products(path: &Path, identity: &str, dry_run: bool) -> Result<(), CommandError> {
    info!(path = %path.display(), "Loading products from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let products = match parse(&content)? {
        Parsed::Valid(products) => products,
        Parsed::Invalid(invalid) => {
            error!("Product validation failed:");
            for rejected in &invalid {
                error!("  - #{} {:?}: {}", rejected.position, rejected.name, rejected.error);
            }
            return Err(SeedError::Invalid(invalid.len()).into());
        }
    };
    info!(products = products.len(), "Products validated");

    if dry_run {
        println!("[ok] {} products are valid (dry run)", products.len());
        return Ok(());
    }

    let client = super::admin::connect(identity).await?;
    let mut created = 0usize;
    for product in &products {
        match client.create_product(product).await {
            Ok(id) => {
                created += 1;
                info!(name = %product.name, id = ?id, "Product created");
            }
            Err(e) => {
                warn!(name = %product.name, created, "Seeding stopped");
                return Err(CommandError::Admin(e.into()));
            }
        }
    }

    println!("[ok] Created {created} products");
    Ok(())
}
