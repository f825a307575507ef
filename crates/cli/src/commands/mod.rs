//! CLI command implementations.
//!
//! Every command runs against a store that has already loaded the cart.

pub mod cart;
pub mod checkout;

use eshop_core::{Price, ProductId};
use eshop_storefront::config::StorefrontConfig;
use eshop_storefront::{CartApiClient, CartApiError, CartStore, Outcome};
use thiserror::Error;

use crate::console::ConsoleNotifier;

/// The store every command operates on.
pub type Store = CartStore<CartApiClient, ConsoleNotifier>;

/// Errors that end a command with a failure exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// The HTTP client could not be built.
    #[error("Cart client error: {0}")]
    Client(#[from] CartApiError),

    /// The store reported a failed or rejected operation.
    #[error("{operation} did not complete ({outcome:?})")]
    NotApplied {
        operation: &'static str,
        outcome: Outcome,
    },
}

/// Arguments of `eshop add`.
pub struct AddArgs {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub category: String,
    pub quantity: i64,
}

/// Arguments of `eshop checkout`.
pub struct CheckoutArgs {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Build the store and load the current cart.
///
/// # Errors
///
/// Returns `CliError::Client` if the HTTP client cannot be built. A failed
/// initial fetch is reported by the store and leaves an empty cart.
pub async fn open_store(config: &StorefrontConfig) -> Result<Store, CliError> {
    let client = CartApiClient::new(&config.api)?;
    let store = CartStore::new(client, ConsoleNotifier).with_user(config.user_id.clone());
    store.fetch_cart().await;
    Ok(store)
}

/// Map a store outcome to the command result. Skipped calls are not failures.
pub fn check(operation: &'static str, outcome: Outcome) -> Result<(), CliError> {
    match outcome {
        Outcome::Applied | Outcome::Skipped => Ok(()),
        Outcome::Rejected | Outcome::Failed => Err(CliError::NotApplied { operation, outcome }),
    }
}
