//! Core types for E-Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{CartLineItem, CartState};
pub use id::*;
pub use price::{Price, PriceError, format_amount};
pub use product::Product;
