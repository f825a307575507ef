//! Client-held cart state.
//!
//! `CartState` is rebuilt wholesale from the server after every mutation, so
//! the only way to install items is [`CartState::from_items`], which derives
//! the item count at the same time. The count can never drift from the items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// One product-quantity pairing within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Catalog product this line refers to.
    pub product_id: ProductId,
    /// Product name, copied at add time.
    pub name: String,
    /// Unit price, copied at add time.
    pub price: Price,
    /// Image URI, copied at add time.
    pub image: String,
    /// Category, copied at add time.
    pub category: String,
    /// Always at least 1.
    pub quantity: u32,
}

impl CartLineItem {
    /// `price * quantity` at full precision.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.quantity)
    }
}

/// Snapshot of the cart as last reconciled with the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    items: Vec<CartLineItem>,
    item_count: u64,
    is_loading: bool,
}

impl CartState {
    /// An empty, idle cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a cart from server-ordered items, deriving the item count.
    ///
    /// Items with a zero quantity are not representable in a cart and are
    /// dropped.
    #[must_use]
    pub fn from_items(items: Vec<CartLineItem>) -> Self {
        let items: Vec<CartLineItem> = items.into_iter().filter(|i| i.quantity > 0).collect();
        let item_count = items.iter().map(|i| u64::from(i.quantity)).sum();
        Self {
            items,
            item_count,
            is_loading: false,
        }
    }

    /// Line items in server response order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Sum of all line item quantities.
    #[must_use]
    pub const fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Whether a fetch round trip is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Mark whether a fetch round trip is outstanding.
    pub const fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `sum(price * quantity)` over all lines, unrounded.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: &str, price: Decimal, quantity: u32) -> CartLineItem {
        CartLineItem {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::new(price).unwrap(),
            image: format!("https://img.example/{id}.png"),
            category: "misc".to_string(),
            quantity,
        }
    }

    #[test]
    fn test_total_matches_scenario() {
        let cart = CartState::from_items(vec![
            line("p1", Decimal::new(1000, 2), 2),
            line("p2", Decimal::new(550, 2), 1),
        ]);
        assert_eq!(cart.total(), Decimal::new(2550, 2));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_total_is_order_independent() {
        let a = line("a", Decimal::new(199, 2), 3);
        let b = line("b", Decimal::new(1, 3), 7);
        let c = line("c", Decimal::from(12), 1);

        let forward = CartState::from_items(vec![a.clone(), b.clone(), c.clone()]);
        let backward = CartState::from_items(vec![c, b, a]);
        assert_eq!(forward.total(), backward.total());
        assert_eq!(forward.item_count(), backward.item_count());
    }

    #[test]
    fn test_zero_quantity_lines_dropped() {
        let cart = CartState::from_items(vec![
            line("p1", Decimal::ONE, 0),
            line("p2", Decimal::ONE, 4),
        ]);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.items()[0].product_id, ProductId::new("p2"));
    }

    #[test]
    fn test_empty_cart() {
        let cart = CartState::empty();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total(), Decimal::ZERO);
        assert!(!cart.is_loading());
    }
}
