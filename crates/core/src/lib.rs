//! E-Shop Core - Shared types library.
//!
//! This crate provides the domain types used across all E-Shop components:
//! - `storefront` - Cart store and REST client for the remote cart service
//! - `cli` - Command-line front end over the cart store
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Cart totals and item counts are derived here so every consumer
//! computes them the same way.
//!
//! # Modules
//!
//! - [`types`] - String IDs, prices, catalog products and cart state

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
