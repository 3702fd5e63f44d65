//! In-memory cart ledger.

use robe_core::{CartLine, Price, Product, ProductId};
use serde::{Deserialize, Serialize};

/// Ordered list of cart lines, at most one per product.
///
/// Serializes as a bare JSON array of lines, the shape kept under the
/// `cart` storage key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLedger {
    lines: Vec<CartLine>,
}

impl CartLedger {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Rebuild a ledger from stored lines, merging duplicate products and
    /// raising zero quantities to 1.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut ledger = Self::new();
        for mut line in lines {
            line.quantity = line.quantity.max(1);
            match ledger.position(&line.product_id) {
                Some(i) => {
                    if let Some(existing) = ledger.lines.get_mut(i) {
                        existing.quantity = existing.quantity.saturating_add(line.quantity);
                    }
                }
                None => ledger.lines.push(line),
            }
        }
        ledger
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.lines.iter().position(|line| &line.product_id == id)
    }

    /// Add `quantity` units of `product`, incrementing an existing line
    /// instead of duplicating it. A zero quantity adds one unit.
    ///
    /// Returns the line's quantity afterwards.
    pub fn add_or_increment(&mut self, product: &Product, quantity: u32) -> u32 {
        let quantity = quantity.max(1);
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return line.quantity;
        }
        self.lines.push(CartLine::from_product(product, quantity));
        quantity
    }

    /// Overwrite the quantity of an existing line.
    ///
    /// Quantities below 1 are ignored (use [`Self::remove`]); so are unknown
    /// products and the line's current quantity. Returns whether the ledger
    /// changed.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: u32) -> bool {
        if quantity < 1 {
            return false;
        }
        match self.lines.iter_mut().find(|l| &l.product_id == id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Delete the line for `id`. Returns the removed line, if any.
    pub fn remove(&mut self, id: &ProductId) -> Option<CartLine> {
        self.position(id).map(|i| self.lines.remove(i))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// `Σ price × quantity`, derived on every call.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total number of units.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, price: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Item {id}"),
            price: Price::from_taka(price),
            category: "bag".into(),
            gender: None,
            color: None,
            image: format!("https://cdn.example.com/{id}.jpg"),
            description: String::new(),
        }
    }

    #[test]
    fn test_add_twice_merges_quantities() {
        let mut ledger = CartLedger::new();
        let tote = product("tote", 500);
        assert_eq!(ledger.add_or_increment(&tote, 2), 2);
        assert_eq!(ledger.add_or_increment(&tote, 3), 5);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(&tote.id).unwrap().quantity, 5);
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut ledger = CartLedger::new();
        ledger.add_or_increment(&product("b", 100), 1);
        ledger.add_or_increment(&product("a", 100), 1);
        ledger.add_or_increment(&product("b", 100), 1);
        let ids: Vec<_> = ledger.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn test_set_quantity_below_one_is_noop() {
        let mut ledger = CartLedger::new();
        let tote = product("tote", 500);
        ledger.add_or_increment(&tote, 2);
        assert!(!ledger.set_quantity(&tote.id, 0));
        assert_eq!(ledger.get(&tote.id).unwrap().quantity, 2);
        assert!(ledger.set_quantity(&tote.id, 7));
        assert_eq!(ledger.get(&tote.id).unwrap().quantity, 7);
        assert!(!ledger.set_quantity(&ProductId::new("missing"), 3));
    }

    #[test]
    fn test_subtotal_tracks_mutations() {
        let mut ledger = CartLedger::new();
        let tote = product("tote", 500);
        let watch = product("watch", 1250);
        ledger.add_or_increment(&tote, 2);
        ledger.add_or_increment(&watch, 1);
        assert_eq!(ledger.subtotal(), Price::from_taka(2250));
        assert_eq!(ledger.item_count(), 3);

        ledger.set_quantity(&watch.id, 2);
        assert_eq!(ledger.subtotal(), Price::from_taka(3500));

        assert!(ledger.remove(&tote.id).is_some());
        assert!(ledger.remove(&tote.id).is_none());
        assert_eq!(ledger.subtotal(), Price::from_taka(2500));

        let expected: Price = ledger.lines().iter().map(CartLine::line_total).sum();
        assert_eq!(ledger.subtotal(), expected);

        ledger.clear();
        assert!(ledger.is_empty());
        assert_eq!(ledger.subtotal(), Price::ZERO);
    }

    #[test]
    fn test_from_lines_merges_duplicates() {
        let line = CartLine::from_product(&product("tote", 500), 1);
        let mut zero = line.clone();
        zero.quantity = 0;
        let ledger = CartLedger::from_lines(vec![line.clone(), zero, line]);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.item_count(), 3);
    }

    #[test]
    fn test_serializes_as_line_array() {
        let mut ledger = CartLedger::new();
        ledger.add_or_increment(&product("tote", 500), 2);
        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json[0]["_id"], "tote");
        assert_eq!(json[0]["quantity"], 2);
        assert_eq!(json[0]["price"], 500);

        let back: CartLedger = serde_json::from_value(json).unwrap();
        assert_eq!(back, ledger);
    }
}
