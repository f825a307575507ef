//! Catalog product as handed to the cart.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A catalog product, carrying the fields the cart denormalizes at add time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Stable catalog reference.
    #[serde(alias = "_id")]
    pub product_id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Image URI.
    pub image: String,
    /// Category name.
    pub category: String,
}
