//! Order summary and order placement.

use eshop_core::{CartState, OrderId, format_amount};
use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::api::{CartService, CreateOrderRequest, OrderItemRequest, ShippingAddress};
use crate::error::{CartError, Result};
use crate::notify::{Notification, Notifier};
use crate::store::{CartStore, Outcome};

/// Totals shown on the cart page and at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSummary {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub item_count: u64,
}

impl OrderSummary {
    /// Summarize a cart. Shipping is free.
    #[must_use]
    pub fn from_state(cart: &CartState) -> Self {
        let subtotal = cart.total();
        let shipping = Decimal::ZERO;
        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
            item_count: cart.item_count(),
        }
    }

    #[must_use]
    pub fn subtotal_display(&self) -> String {
        format_amount(self.subtotal)
    }

    /// `"Free"` when shipping costs nothing.
    #[must_use]
    pub fn shipping_display(&self) -> String {
        if self.shipping.is_zero() {
            "Free".to_string()
        } else {
            format_amount(self.shipping)
        }
    }

    #[must_use]
    pub fn total_display(&self) -> String {
        format_amount(self.total)
    }
}

impl ShippingAddress {
    /// Check that every field is filled in.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidInput` naming the first blank field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("Address", &self.address),
            ("City", &self.city),
            ("Postal code", &self.postal_code),
            ("Country", &self.country),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(CartError::InvalidInput(format!("{name} is required"))),
            None => Ok(()),
        }
    }
}

/// Build the order body from the current cart.
fn order_request(cart: &CartState, shipping_address: ShippingAddress) -> CreateOrderRequest {
    let items = cart
        .items()
        .iter()
        .map(|line| OrderItemRequest {
            product: line.product_id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            price: line.price,
            image: line.image.clone(),
        })
        .collect();

    CreateOrderRequest {
        items,
        shipping_address,
        total_price: OrderSummary::from_state(cart).total,
    }
}

impl<S: CartService, N: Notifier> CartStore<S, N> {
    /// Place an order for the current cart, then clear it.
    ///
    /// An empty cart or an incomplete address is rejected without a request.
    /// If the order request fails the cart is left untouched.
    #[instrument(skip(self, shipping_address))]
    pub async fn place_order(&self, shipping_address: ShippingAddress) -> Outcome {
        match self.try_place_order(shipping_address).await {
            Ok(order_id) => {
                info!(order_id = ?order_id.as_ref().map(OrderId::as_str), "Order placed");
                self.notifier
                    .notify(Notification::success("Order placed successfully!"));
                self.clear_cart().await;
                Outcome::Applied
            }
            Err(e) => self.fail(&e, "Failed to place order"),
        }
    }

    async fn try_place_order(&self, shipping_address: ShippingAddress) -> Result<Option<OrderId>> {
        let cart = self.snapshot().await;
        if cart.is_empty() {
            return Err(CartError::EmptyCart);
        }
        shipping_address.validate()?;

        let request = order_request(&cart, shipping_address);
        let response = self.service.create_order(&request).await?;
        Ok(response.id)
    }
}
