//! Order dashboard figures.

use chrono::{DateTime, Datelike, Utc};
use robe_core::{Order, Price};

/// Headline numbers shown above the order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderStats {
    pub total_orders: usize,
    /// Sum of every order's total.
    pub revenue: Price,
    /// Zero when there are no orders.
    pub average_order: Price,
    /// Orders placed in the calendar month of `now` (UTC).
    pub this_month: usize,
}

impl OrderStats {
    #[must_use]
    pub fn from_orders(orders: &[Order], now: DateTime<Utc>) -> Self {
        let revenue: Price = orders.iter().map(Order::total).sum();
        let this_month = orders
            .iter()
            .filter_map(|o| o.created_at)
            .filter(|at| at.year() == now.year() && at.month() == now.month())
            .count();
        Self {
            total_orders: orders.len(),
            revenue,
            average_order: revenue.average_over(orders.len()),
            this_month,
        }
    }
}

/// Orders sorted newest first; undated orders go last.
#[must_use]
pub fn newest_first(orders: &[Order]) -> Vec<&Order> {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}
