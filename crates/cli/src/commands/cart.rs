//! Cart commands.

use std::fmt::Write as _;

use eshop_core::{CartState, Product, ProductId, format_amount};
use eshop_storefront::OrderSummary;

use super::{AddArgs, CliError, Store, check};
use crate::console::print;

/// Print the cart page: one row per line, then the order summary.
pub async fn show(store: &Store) -> Result<(), CliError> {
    print(&render_cart(&store.snapshot().await));
    Ok(())
}

/// Print the header badge count.
pub async fn count(store: &Store) -> Result<(), CliError> {
    print(&store.item_count().await.to_string());
    Ok(())
}

/// Print the cart total.
pub async fn total(store: &Store) -> Result<(), CliError> {
    print(&format_amount(store.cart_total().await));
    Ok(())
}

pub async fn add(store: &Store, args: AddArgs) -> Result<(), CliError> {
    let product = Product {
        product_id: args.product_id,
        name: args.name,
        price: args.price,
        image: args.image,
        category: args.category,
    };
    check("Add to cart", store.add_to_cart(&product, args.quantity).await)
}

pub async fn remove(store: &Store, product_id: &ProductId) -> Result<(), CliError> {
    check("Remove from cart", store.remove_from_cart(product_id).await)
}

pub async fn update(store: &Store, product_id: &ProductId, quantity: i64) -> Result<(), CliError> {
    check(
        "Update quantity",
        store.update_quantity(product_id, quantity).await,
    )
}

pub async fn clear(store: &Store) -> Result<(), CliError> {
    check("Clear cart", store.clear_cart().await)
}

/// Render the cart page as plain text.
pub fn render_cart(cart: &CartState) -> String {
    if cart.is_empty() {
        return "Your cart is empty".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Shopping Cart ({} items)", cart.item_count());
    let _ = writeln!(out);

    let name_width = cart
        .items()
        .iter()
        .map(|line| line.name.chars().count())
        .max()
        .unwrap_or(0);

    for line in cart.items() {
        let _ = writeln!(
            out,
            "  {:<name_width$}  x{:<4} {:>10} {:>10}  [{}]",
            line.name,
            line.quantity,
            line.price.display(),
            format_amount(line.line_total()),
            line.product_id,
        );
    }

    let _ = writeln!(out);
    out.push_str(&render_summary(&OrderSummary::from_state(cart)));
    out
}

/// Render the order summary block.
pub fn render_summary(summary: &OrderSummary) -> String {
    format!(
        "Subtotal  {:>10}\nShipping  {:>10}\nTotal     {:>10}",
        summary.subtotal_display(),
        summary.shipping_display(),
        summary.total_display(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use eshop_core::{CartLineItem, Price};

    use super::*;

    fn line(id: &str, name: &str, price: &str, quantity: u32) -> CartLineItem {
        CartLineItem {
            product_id: ProductId::new(id),
            name: name.to_string(),
            price: price.parse::<Price>().unwrap(),
            image: String::new(),
            category: String::new(),
            quantity,
        }
    }

    #[test]
    fn test_render_empty_cart() {
        assert_eq!(render_cart(&CartState::empty()), "Your cart is empty");
    }

    #[test]
    fn test_render_cart_lines_and_summary() {
        let cart = CartState::from_items(vec![
            line("p1", "Desk Lamp", "10.00", 2),
            line("p2", "Mug", "5.50", 1),
        ]);
        let text = render_cart(&cart);

        assert!(text.starts_with("Shopping Cart (3 items)"));
        assert!(text.contains("Desk Lamp"));
        assert!(text.contains("$20.00"));
        assert!(text.contains("[p2]"));
        assert!(text.ends_with("Total         $25.50"));
        assert!(text.contains("Shipping        Free"));
    }
}
