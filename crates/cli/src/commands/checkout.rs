//! Checkout command.

use eshop_storefront::{OrderSummary, ShippingAddress};

use super::cart::render_summary;
use super::{CheckoutArgs, CliError, Store, check};
use crate::console::print;

/// Print the order summary, then place the order.
pub async fn place_order(store: &Store, args: CheckoutArgs) -> Result<(), CliError> {
    let cart = store.snapshot().await;
    if !cart.is_empty() {
        print(&render_summary(&OrderSummary::from_state(&cart)));
    }

    let address = ShippingAddress {
        address: args.address,
        city: args.city,
        postal_code: args.postal_code,
        country: args.country,
    };
    check("Place order", store.place_order(address).await)
}
