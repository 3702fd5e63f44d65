//! Catalog filtering and sorting.
//!
//! Everything here is pure: a [`CatalogQuery`] is applied to a borrowed
//! product slice and yields a new view without touching the input. It is
//! cheap enough to recompute on every filter change.

use core::fmt;
use std::cmp::Ordering;
use std::str::FromStr;

use robe_core::{Category, Gender, Price, Product, Swatch};
use rust_decimal::Decimal;

/// Price brackets offered by the shop filter.
///
/// Bounds are contiguous: every non-negative price falls in exactly one
/// bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceBracket {
    /// Up to and including Tk 1000.
    UpTo1000,
    /// Above 1000, up to 1500.
    To1500,
    /// Above 1500, up to 2000.
    To2000,
    /// Above 2000, up to 3000.
    To3000,
    /// Above 3000, up to 4000.
    To4000,
    /// Above 4000, up to 5000.
    To5000,
    /// Above 5000.
    Above5000,
}

impl PriceBracket {
    pub const ALL: [Self; 7] = [
        Self::UpTo1000,
        Self::To1500,
        Self::To2000,
        Self::To3000,
        Self::To4000,
        Self::To5000,
        Self::Above5000,
    ];

    /// Exclusive lower and inclusive upper bound, in whole Taka.
    const fn bounds(self) -> (Option<u32>, Option<u32>) {
        match self {
            Self::UpTo1000 => (None, Some(1000)),
            Self::To1500 => (Some(1000), Some(1500)),
            Self::To2000 => (Some(1500), Some(2000)),
            Self::To3000 => (Some(2000), Some(3000)),
            Self::To4000 => (Some(3000), Some(4000)),
            Self::To5000 => (Some(4000), Some(5000)),
            Self::Above5000 => (Some(5000), None),
        }
    }

    /// Whether `price` falls inside this bracket.
    #[must_use]
    pub fn contains(self, price: Price) -> bool {
        let amount = price.amount();
        let (above, up_to) = self.bounds();
        above.is_none_or(|lo| amount > Decimal::from(lo))
            && up_to.is_none_or(|hi| amount <= Decimal::from(hi))
    }

    /// Short id used on the command line and in saved filters.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::UpTo1000 => "p1",
            Self::To1500 => "p2",
            Self::To2000 => "p3",
            Self::To3000 => "p4",
            Self::To4000 => "p5",
            Self::To5000 => "p6",
            Self::Above5000 => "p7",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::UpTo1000 => "Up to Tk. 1000",
            Self::To1500 => "Tk. 1001 - Tk. 1500",
            Self::To2000 => "Tk. 1501 - Tk. 2000",
            Self::To3000 => "Tk. 2001 - Tk. 3000",
            Self::To4000 => "Tk. 3001 - Tk. 4000",
            Self::To5000 => "Tk. 4001 - Tk. 5000",
            Self::Above5000 => "Above Tk. 5000",
        }
    }
}

impl fmt::Display for PriceBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PriceBracket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|b| b.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown price bracket {s:?} (expected p1..p7)"))
    }
}

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    /// Keep the catalog's own order.
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
}

impl SortKey {
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Featured => "Featured",
            Self::PriceAsc => "Price: Low to High",
            Self::PriceDesc => "Price: High to Low",
        }
    }

    fn comparator(self) -> Option<fn(&&Product, &&Product) -> Ordering> {
        match self {
            Self::Featured => None,
            Self::PriceAsc => Some(|a: &&Product, b: &&Product| a.price.cmp(&b.price)),
            Self::PriceDesc => Some(|a: &&Product, b: &&Product| b.price.cmp(&a.price)),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "featured" => Ok(Self::Featured),
            "price-asc" | "priceasc" => Ok(Self::PriceAsc),
            "price-desc" | "pricedesc" => Ok(Self::PriceDesc),
            other => Err(format!("unknown sort {other:?}")),
        }
    }
}

/// Current filter selections plus sort order.
///
/// Each predicate is independently optional; active predicates combine
/// with AND. An empty query passes the catalog through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub gender: Option<Gender>,
    pub price: Option<PriceBracket>,
    pub color: Option<Swatch>,
    /// Category label; matched case-insensitively against product data.
    pub category: Option<String>,
    pub sort: SortKey,
}

impl CatalogQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn gender(mut self, gender: Option<Gender>) -> Self {
        self.gender = gender;
        self
    }

    #[must_use]
    pub const fn price(mut self, price: Option<PriceBracket>) -> Self {
        self.price = price;
        self
    }

    #[must_use]
    pub const fn color(mut self, color: Option<Swatch>) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn category(mut self, category: Option<impl Into<String>>) -> Self {
        self.category = category.map(Into::into);
        self
    }

    #[must_use]
    pub const fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// No predicate is active (sort order is not a predicate).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.gender.is_none() && self.price.is_none() && self.color.is_none() && self.category.is_none()
    }

    /// Reset every predicate and the sort order.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether `product` satisfies every active predicate.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let by_gender = self.gender.is_none_or(|g| product.gender == Some(g));
        let by_price = self.price.is_none_or(|b| b.contains(product.price));
        let by_color = self.color.is_none_or(|c| {
            product
                .color
                .as_deref()
                .is_some_and(|pc| pc.trim().eq_ignore_ascii_case(c.name()))
        });
        let by_category = self
            .category
            .as_deref()
            .is_none_or(|c| product.in_category(c));
        by_gender && by_price && by_color && by_category
    }

    /// Filter then sort. Sorting is stable, so ties keep catalog order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut out: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();
        if let Some(cmp) = self.sort.comparator() {
            out.sort_by(cmp);
        }
        out
    }
}

/// Categories present in the catalog, de-duplicated case-insensitively in
/// first-seen order.
#[must_use]
pub fn distinct_categories(products: &[Product]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for product in products {
        let category = product.category.trim();
        if !category.is_empty() && !seen.iter().any(|s| s.eq_ignore_ascii_case(category)) {
            seen.push(category);
        }
    }
    seen
}

/// Products of a single category in the requested order, for the
/// per-category collection pages.
#[must_use]
pub fn collection(products: &[Product], category: Category, sort: SortKey) -> Vec<&Product> {
    CatalogQuery::new()
        .category(Some(category.as_str()))
        .sort(sort)
        .apply(products)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use robe_core::ProductId;

    use super::*;

    fn product(id: &str, price: u32, category: &str, gender: Option<Gender>, color: Option<&str>) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::from_taka(price),
            category: category.to_string(),
            gender,
            color: color.map(str::to_string),
            image: String::new(),
            description: String::new(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("a", 1200, "panjabi", Some(Gender::Men), Some("navy")),
            product("b", 800, "Bag", Some(Gender::Women), Some("Black")),
            product("c", 5200, "sharee", Some(Gender::Women), Some("red")),
            product("d", 1200, "panjabi", Some(Gender::Men), Some("white")),
            product("e", 450, "watch", None, None),
            product("f", 2600, "bag", Some(Gender::Women), Some("black")),
        ]
    }

    fn ids(view: &[&Product]) -> Vec<String> {
        view.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_empty_query_is_identity() {
        let products = catalog();
        let query = CatalogQuery::new();
        assert!(query.is_empty());
        assert_eq!(ids(&query.apply(&products)), ["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_predicates_combine_with_and() {
        let products = catalog();
        let query = CatalogQuery::new()
            .gender(Some(Gender::Women))
            .color(Some(Swatch::Black))
            .category(Some("BAG"));
        let view = query.apply(&products);
        assert_eq!(ids(&view), ["b", "f"]);

        let narrowed = query.price(Some(PriceBracket::To3000));
        assert_eq!(ids(&narrowed.apply(&products)), ["f"]);
    }

    #[test]
    fn test_result_is_subset_satisfying_every_predicate() {
        let products = catalog();
        for gender in [None, Some(Gender::Men), Some(Gender::Women)] {
            for price in std::iter::once(None).chain(PriceBracket::ALL.map(Some)) {
                for color in [None, Some(Swatch::Black), Some(Swatch::Navy)] {
                    let query = CatalogQuery::new().gender(gender).price(price).color(color);
                    let view = query.apply(&products);
                    assert!(view.len() <= products.len());
                    assert!(view.iter().all(|p| query.matches(p)));
                    assert!(view.iter().all(|p| products.iter().any(|q| q.id == p.id)));
                }
            }
        }
    }

    #[test]
    fn test_products_without_attribute_fail_that_predicate() {
        let products = catalog();
        let view = CatalogQuery::new().color(Some(Swatch::Red)).apply(&products);
        assert_eq!(ids(&view), ["c"]);
        let view = CatalogQuery::new().gender(Some(Gender::Men)).apply(&products);
        assert!(!ids(&view).contains(&"e".to_string()));
    }

    #[test]
    fn test_sort_orders() {
        let products = catalog();
        let asc = CatalogQuery::new().sort(SortKey::PriceAsc).apply(&products);
        assert!(asc.windows(2).all(|w| w[0].price <= w[1].price));
        // Stable: "a" precedes "d" at the same price.
        assert_eq!(ids(&asc), ["e", "b", "a", "d", "f", "c"]);

        let desc = CatalogQuery::new().sort(SortKey::PriceDesc).apply(&products);
        assert!(desc.windows(2).all(|w| w[0].price >= w[1].price));
        assert_eq!(ids(&desc), ["c", "f", "a", "d", "b", "e"]);

        let featured = CatalogQuery::new().sort(SortKey::Featured).apply(&products);
        assert_eq!(ids(&featured), ["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_price_brackets_are_contiguous() {
        let cases = [
            (0, PriceBracket::UpTo1000),
            (1000, PriceBracket::UpTo1000),
            (1001, PriceBracket::To1500),
            (1500, PriceBracket::To1500),
            (2000, PriceBracket::To2000),
            (3000, PriceBracket::To3000),
            (4001, PriceBracket::To5000),
            (5000, PriceBracket::To5000),
            (5001, PriceBracket::Above5000),
        ];
        for (taka, expected) in cases {
            let price = Price::from_taka(taka);
            let hits: Vec<_> = PriceBracket::ALL.into_iter().filter(|b| b.contains(price)).collect();
            assert_eq!(hits, [expected], "price {taka}");
        }
        let between: Price = "1500.50".parse().unwrap();
        assert!(PriceBracket::To2000.contains(between));
    }

    #[test]
    fn test_parse_selectors() {
        assert_eq!("P3".parse::<PriceBracket>().unwrap(), PriceBracket::To2000);
        assert!("p9".parse::<PriceBracket>().is_err());
        assert_eq!("price-desc".parse::<SortKey>().unwrap(), SortKey::PriceDesc);
        assert_eq!("priceAsc".parse::<SortKey>().unwrap(), SortKey::PriceAsc);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut query = CatalogQuery::new()
            .gender(Some(Gender::Men))
            .sort(SortKey::PriceDesc);
        query.clear();
        assert_eq!(query, CatalogQuery::default());
    }

    #[test]
    fn test_distinct_categories_and_collection() {
        let products = catalog();
        assert_eq!(distinct_categories(&products), ["panjabi", "Bag", "sharee", "watch"]);

        let bags = collection(&products, Category::Bag, SortKey::PriceDesc);
        assert_eq!(ids(&bags), ["f", "b"]);
    }
}
