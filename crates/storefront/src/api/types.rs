//! Wire types for the cart service.
//!
//! Response types are deliberately lenient: every field the backend might
//! omit has a default so a partial line can be inspected and dropped instead
//! of failing the whole response.

use eshop_core::{OrderId, Price, ProductId, UserId};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// Fetch
// =============================================================================

/// Body of `GET /cart`.
///
/// A body without `items` (or with `items: null`) is an empty cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartResponse {
    #[serde(default)]
    pub items: Option<Vec<RawCartItem>>,
}

/// A cart line as stored by the backend.
///
/// A field that is missing, `null` or of an unexpected type reads as `None`.
/// Quantities are accepted as integers, whole floats (`2.0`) or numeric
/// strings (`"2"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCartItem {
    #[serde(default, deserialize_with = "lenient")]
    pub product: Option<ProductRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub quantity: Option<i64>,
}

/// Deserialize any JSON value, keeping it only if it has the shape of `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| T::deserialize(v).ok()))
}

fn lenient_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(whole_number))
}

/// Read a number or numeric string with no fractional part.
fn whole_number(value: &Value) -> Option<i64> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    let amount: Decimal = text.parse().ok()?;
    if !amount.fract().is_zero() {
        return None;
    }
    amount.to_i64()
}

/// Reference to a product inside a cart line.
///
/// The backend returns either a plain id string, an extended-JSON object id
/// (`{ "$oid": "..." }`), or a populated product document carrying `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Id(String),
    ObjectId {
        #[serde(rename = "$oid")]
        oid: String,
    },
    Document {
        #[serde(rename = "_id")]
        id: Box<ProductRef>,
    },
}

impl ProductRef {
    /// Normalize to a plain product id. Blank ids yield `None`.
    #[must_use]
    pub fn into_product_id(self) -> Option<ProductId> {
        let id = match self {
            Self::Id(id) | Self::ObjectId { oid: id } => ProductId::new(id),
            Self::Document { id } => return id.into_product_id(),
        };
        (!id.is_blank()).then_some(id)
    }
}

// =============================================================================
// Mutations
// =============================================================================

/// Body of `POST /cart/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub quantity: u32,
    pub category: String,
}

/// Body of `PUT /cart/{productId}/quantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// Body of `DELETE /cart/clear`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearCartRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

// =============================================================================
// Orders
// =============================================================================

/// Shipping destination entered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// One ordered product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub product: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: Price,
    pub image: String,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub shipping_address: ShippingAddress,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

/// Response of `POST /orders`. Only the id is read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResponse {
    #[serde(default, rename = "_id", alias = "id")]
    pub id: Option<OrderId>,
}
