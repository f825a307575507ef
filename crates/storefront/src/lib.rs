//! E-Shop storefront cart library.
//!
//! This crate owns the client side of the shopping cart:
//! - [`api`] - REST client for the remote cart service
//! - [`store`] - The session's cart, kept in sync with the service
//! - [`checkout`] - Order summary and order placement
//! - [`notify`] - User-visible success and error notifications
//! - [`config`] - Environment-based configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notify;
pub mod store;

#[cfg(test)]
mod fake;

pub use api::{CartApiClient, CartApiError, CartService, ShippingAddress};
pub use checkout::OrderSummary;
pub use config::{CartApiConfig, ConfigError, StorefrontConfig};
pub use error::CartError;
pub use notify::{MemoryNotifier, Notification, NotificationLevel, Notifier};
pub use store::{CartStore, Outcome};
