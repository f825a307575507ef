//! Remote cart service contract and its REST client.
//!
//! # Architecture
//!
//! - The backend is the source of truth - the client never merges cart lines
//!   locally, it re-reads the cart after every mutation
//! - [`CartService`] is the seam the cart store talks through; the REST
//!   implementation is [`CartApiClient`]
//! - Raw wire shapes live in [`types`] and are normalized into domain types
//!   by [`conversions`]
//!
//! # Endpoints
//!
//! | Operation | Method | Path |
//! |---|---|---|
//! | Fetch cart | GET | `/cart` |
//! | Add item | POST | `/cart/add` |
//! | Remove item | DELETE | `/cart/{productId}` |
//! | Update quantity | PUT | `/cart/{productId}/quantity` |
//! | Clear cart | DELETE | `/cart/clear` |
//! | Create order | POST | `/orders` |

mod client;
pub mod conversions;
pub mod types;

use std::future::Future;
use std::sync::Arc;

use eshop_core::{ProductId, UserId};
use thiserror::Error;

pub use client::CartApiClient;
pub use types::{
    AddItemRequest, CartResponse, CreateOrderRequest, OrderItemRequest, OrderResponse,
    ProductRef, RawCartItem, ShippingAddress,
};

/// Errors that can occur when talking to the cart service.
#[derive(Debug, Error)]
pub enum CartApiError {
    /// HTTP request failed or timed out.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A path segment would change the request path once resolved.
    #[error("Invalid path segment: {0:?}")]
    InvalidPath(String),
}

impl CartApiError {
    /// Whether the error was a network timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

/// The remote cart service, as consumed by the cart store.
///
/// Mutating calls return only an acknowledgement; callers reconcile by
/// calling [`CartService::get_cart`] afterwards.
pub trait CartService: Send + Sync {
    /// Read the session's cart.
    fn get_cart(&self) -> impl Future<Output = Result<CartResponse, CartApiError>> + Send;

    /// Add `request.quantity` units of a product, or increment an existing line.
    fn add_item(
        &self,
        request: &AddItemRequest,
    ) -> impl Future<Output = Result<(), CartApiError>> + Send;

    /// Remove a product's line entirely.
    fn remove_item(
        &self,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), CartApiError>> + Send;

    /// Set a product's line quantity.
    fn update_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), CartApiError>> + Send;

    /// Remove every line, scoped to the given session identity.
    fn clear(
        &self,
        user_id: Option<&UserId>,
    ) -> impl Future<Output = Result<(), CartApiError>> + Send;

    /// Create an order from checkout data.
    fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> impl Future<Output = Result<OrderResponse, CartApiError>> + Send;
}

impl<S: CartService> CartService for Arc<S> {
    fn get_cart(&self) -> impl Future<Output = Result<CartResponse, CartApiError>> + Send {
        (**self).get_cart()
    }

    fn add_item(
        &self,
        request: &AddItemRequest,
    ) -> impl Future<Output = Result<(), CartApiError>> + Send {
        (**self).add_item(request)
    }

    fn remove_item(
        &self,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), CartApiError>> + Send {
        (**self).remove_item(product_id)
    }

    fn update_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), CartApiError>> + Send {
        (**self).update_quantity(product_id, quantity)
    }

    fn clear(
        &self,
        user_id: Option<&UserId>,
    ) -> impl Future<Output = Result<(), CartApiError>> + Send {
        (**self).clear(user_id)
    }

    fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> impl Future<Output = Result<OrderResponse, CartApiError>> + Send {
        (**self).create_order(request)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = CartApiError::Api {
            status: 404,
            message: "Cart not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Cart not found");
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_parse_error_display() {
        let err = serde_json::from_str::<CartResponse>("{").unwrap_err();
        let err = CartApiError::from(err);
        assert!(err.to_string().starts_with("JSON parse error:"));
    }
}
