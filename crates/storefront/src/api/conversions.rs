//! Cart response conversion functions.

use eshop_core::{CartLineItem, CartState, Price};
use tracing::warn;

use super::types::{CartResponse, RawCartItem};

/// Convert a fetched cart into client state.
///
/// A missing `items` field is an empty cart. Lines that cannot be normalized
/// are dropped and logged; they never fail the whole cart.
#[must_use]
pub fn convert_cart(response: CartResponse) -> CartState {
    let items = response
        .items
        .unwrap_or_default()
        .into_iter()
        .filter_map(convert_line)
        .collect();
    CartState::from_items(items)
}

/// Convert one raw line, or `None` if it is unusable.
#[must_use]
pub fn convert_line(raw: RawCartItem) -> Option<CartLineItem> {
    let Some(product_id) = raw.product.and_then(super::ProductRef::into_product_id) else {
        warn!(
            name = raw.name.as_deref().unwrap_or_default(),
            "Dropping cart line without a product id"
        );
        return None;
    };

    let quantity = match raw.quantity.map(u32::try_from) {
        Some(Ok(q)) if q > 0 => q,
        _ => {
            warn!(product_id = %product_id, quantity = ?raw.quantity, "Dropping cart line with invalid quantity");
            return None;
        }
    };

    let price = match raw.price.map(Price::new) {
        Some(Ok(price)) => price,
        Some(Err(e)) => {
            warn!(product_id = %product_id, error = %e, "Dropping cart line with invalid price");
            return None;
        }
        None => {
            warn!(product_id = %product_id, "Dropping cart line without a price");
            return None;
        }
    };

    Some(CartLineItem {
        product_id,
        name: raw.name.unwrap_or_default(),
        price,
        image: raw.image.unwrap_or_default(),
        category: raw.category.unwrap_or_default(),
        quantity,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use eshop_core::ProductId;
    use rust_decimal::Decimal;

    use super::*;

    fn parse(json: &str) -> CartState {
        convert_cart(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_object_id_normalized() {
        let cart = parse(
            r#"{ "items": [{ "product": { "$oid": "abc123" }, "name": "X", "price": 1,
                 "image": "i", "category": "c", "quantity": 3 }] }"#,
        );
        let line = &cart.items()[0];
        assert_eq!(line.product_id, ProductId::new("abc123"));
        assert_eq!(line.name, "X");
        assert_eq!(line.price.amount(), Decimal::ONE);
        assert_eq!(line.image, "i");
        assert_eq!(line.category, "c");
        assert_eq!(line.quantity, 3);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_plain_and_object_ids_mix() {
        let cart = parse(
            r#"{ "items": [
                { "product": "p1", "name": "A", "price": 10.00, "image": "a", "category": "c", "quantity": 2 },
                { "product": { "$oid": "p2" }, "name": "B", "price": "5.50", "image": "b", "category": "c", "quantity": 1 }
            ] }"#,
        );
        let ids: Vec<&str> = cart.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, ["p1", "p2"]);
        assert_eq!(cart.total(), Decimal::new(2550, 2));
    }

    #[test]
    fn test_missing_items_is_empty_cart() {
        let cart = parse(r#"{ "message": "no cart yet" }"#);
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_unusable_lines_dropped() {
        let cart = parse(
            r#"{ "items": [
                { "name": "no product", "price": 1, "quantity": 1 },
                { "product": "p0", "name": "zero", "price": 1, "quantity": 0 },
                { "product": "pn", "name": "negative price", "price": -4, "quantity": 1 },
                { "product": "pm", "name": "no price", "quantity": 1 },
                { "product": "pf", "name": "fractional", "price": 1, "quantity": 1.5 },
                { "product": "pq", "name": "no quantity", "price": 1 },
                { "product": "ok", "name": "fine", "price": 2, "quantity": 5 }
            ] }"#,
        );
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].product_id.as_str(), "ok");
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_null_display_fields_keep_the_line() {
        let cart = parse(
            r#"{ "items": [
                { "product": "p1", "name": "Lamp", "price": 3, "image": null, "category": null, "quantity": 1 },
                { "product": "p2", "name": "Mug", "price": 2, "image": "m", "category": "c", "quantity": 2 }
            ] }"#,
        );
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].image, "");
        assert_eq!(cart.items()[0].category, "");
        assert_eq!(cart.items()[1].product_id, ProductId::new("p2"));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_whole_float_and_string_quantities() {
        let cart = parse(
            r#"{ "items": [
                { "product": "p1", "name": "A", "price": 1, "quantity": 2.0 },
                { "product": "p2", "name": "B", "price": 1, "quantity": "2" }
            ] }"#,
        );
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.item_count(), 4);
    }
}
