//! Errors at the cart store boundary.
//!
//! Store internals propagate `CartError` with `?`. The public store operations
//! catch every `CartError`, log it, and turn it into a user notification, so
//! nothing in here ever reaches a caller as an `Err`.

use thiserror::Error;

use crate::api::CartApiError;

/// Error raised while performing a cart operation.
#[derive(Debug, Error)]
pub enum CartError {
    /// The remote cart service failed or timed out.
    #[error("Cart service error: {0}")]
    Api(#[from] CartApiError),

    /// The caller passed input the operation cannot accept.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Checkout was attempted with no items in the cart.
    #[error("Cart is empty")]
    EmptyCart,
}

impl CartError {
    /// Message suitable for a user-facing notification.
    ///
    /// Service errors are replaced by `fallback`; internal details stay in
    /// the logs.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(_) => fallback.to_string(),
            Self::InvalidInput(msg) => msg.clone(),
            Self::EmptyCart => "Your cart is empty".to_string(),
        }
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_service_details() {
        let err = CartError::Api(CartApiError::Api {
            status: 500,
            message: "stack trace here".to_string(),
        });
        assert_eq!(err.user_message("Failed to add item to cart"), "Failed to add item to cart");
    }

    #[test]
    fn test_user_message_keeps_validation_text() {
        let err = CartError::InvalidInput("No product ID provided for removal".to_string());
        assert_eq!(err.user_message("ignored"), "No product ID provided for removal");
        assert_eq!(CartError::EmptyCart.user_message("ignored"), "Your cart is empty");
    }

    #[test]
    fn test_display() {
        let err = CartError::InvalidInput("quantity".to_string());
        assert_eq!(err.to_string(), "Invalid input: quantity");
    }
}
