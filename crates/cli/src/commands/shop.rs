//! Catalog browsing: `shop`, `collection` and `product`.

use std::fmt::Write as _;

use robe_core::{Category, Product, ProductId};
use robe_storefront::Storefront;
use robe_storefront::catalog::{self, CatalogQuery, SortKey};
use robe_storefront::error::{AppError, Result};
use robe_storefront::pager::{self, COLLECTION_PAGE_SIZE, Page, PageButton, Pager, SHOP_PAGE_SIZES};
use tracing::info;

/// List the filtered catalog one page at a time.
///
/// # Errors
///
/// Returns `BadRequest` for a page size other than 12, 24 or 48, or the
/// backend error when the catalog cannot be loaded.
pub async fn browse(
    store: &Storefront,
    query: &CatalogQuery,
    per_page: usize,
    page: usize,
) -> Result<()> {
    if !SHOP_PAGE_SIZES.contains(&per_page) {
        return Err(AppError::BadRequest(format!(
            "Products per page must be one of {SHOP_PAGE_SIZES:?}"
        )));
    }

    let products = store.client().list_products().await?;
    let matching = query.apply(&products);
    info!(total = products.len(), matching = matching.len(), "Catalog filtered");

    if matching.is_empty() {
        println!("No products match these filters.");
        if !query.is_empty() {
            let categories = catalog::distinct_categories(&products);
            println!("Categories in stock: {}", categories.join(", "));
        }
        return Ok(());
    }

    println!("Sort: {}", query.sort.label());
    print_page(&Pager::new(per_page).paginate(&matching, page));
    Ok(())
}

/// List one category with the collection page size.
///
/// # Errors
///
/// Returns the backend error when the catalog cannot be loaded.
pub async fn collection(
    store: &Storefront,
    category: Category,
    sort: SortKey,
    page: usize,
) -> Result<()> {
    let products = store.client().list_products().await?;
    let items = catalog::collection(&products, category, sort);

    println!("{} ({})", category, sort.label());
    if items.is_empty() {
        println!("Nothing in this collection yet.");
        return Ok(());
    }
    print_page(&Pager::new(COLLECTION_PAGE_SIZE).paginate(&items, page));
    Ok(())
}

/// Show a single product's details.
///
/// # Errors
///
/// Returns `Api(NotFound)` for an unknown id.
pub async fn product(store: &Storefront, id: &ProductId) -> Result<()> {
    let product = store.client().get_product(id).await?;
    print!("{}", render_product(&product));
    Ok(())
}

fn print_page(page: &Page<'_, &Product>) {
    println!(
        "Showing {}-{} of {}",
        page.first_index(),
        page.offset + page.items.len(),
        page.total_items
    );
    println!();
    for product in page.items {
        println!("{}", render_row(product));
    }
    if page.total_pages > 1 {
        println!();
        println!("{}", render_buttons(page.number, page.total_pages));
    }
}

pub fn render_row(product: &Product) -> String {
    format!(
        "{:<26} {:<32} {:>10}  {}",
        product.id,
        product.name,
        product.price.to_string(),
        product.category
    )
}

fn render_product(product: &Product) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", product.name);
    let _ = writeln!(out, "  id:       {}", product.id);
    let _ = writeln!(out, "  price:    {}", product.price);
    let _ = writeln!(out, "  category: {}", product.category);
    if let Some(gender) = product.gender {
        let _ = writeln!(out, "  gender:   {gender}");
    }
    if let Some(color) = &product.color {
        let _ = writeln!(out, "  color:    {color}");
    }
    let _ = writeln!(out, "  image:    {}", product.image);
    if !product.description.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", product.description);
    }
    out
}

/// Page selector line, e.g. `< 1 ... 4 [5] 6 ... 9 >`.
fn render_buttons(current: usize, total: usize) -> String {
    let mut parts = Vec::new();
    if current > 1 {
        parts.push("<".to_string());
    }
    for button in pager::buttons(current, total) {
        parts.push(match button {
            PageButton::Number(n) if n == current => format!("[{n}]"),
            PageButton::Number(n) => n.to_string(),
            PageButton::Ellipsis => "...".to_string(),
        });
    }
    if current < total {
        parts.push(">".to_string());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use robe_core::Price;

    use super::*;

    #[test]
    fn test_render_buttons() {
        assert_eq!(render_buttons(1, 3), "[1] 2 3 >");
        assert_eq!(render_buttons(5, 9), "< 1 ... 4 [5] 6 ... 9 >");
        assert_eq!(render_buttons(9, 9), "< 1 ... 7 8 [9]");
    }

    #[test]
    fn test_render_product_skips_missing_fields() {
        let product = Product {
            id: ProductId::new("p1"),
            name: "Jamdani Sharee".to_string(),
            price: Price::from_taka(4500),
            category: "sharee".to_string(),
            gender: None,
            color: None,
            image: "https://img.example/1.jpg".to_string(),
            description: String::new(),
        };
        let out = render_product(&product);
        assert!(out.starts_with("Jamdani Sharee\n"));
        assert!(out.contains("price:    Tk 4,500"));
        assert!(!out.contains("gender"));
        assert!(!out.contains("color"));
    }
}
