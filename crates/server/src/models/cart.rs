//! Cart models.
//!
//! The total is derived, never stored: every read recomputes
//! `Σ price × quantity` over the cart's items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use meridian_core::{CartId, CartItemId, ProductId, Quantity, UserId, VariantId};

use super::category::Category;

/// A cart row, keyed by exactly one of user id or session token.
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: Option<UserId>,
    #[serde(skip_serializing)]
    pub session_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A cart line with its nested variant, product, and category data.
///
/// `price` is the snapshot taken at add time; it does not track later
/// variant price changes.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub quantity: Quantity,
    pub price: Decimal,
    pub variant: CartItemVariant,
}

impl CartItem {
    /// Line total: snapshot price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity.as_i32())
    }
}

/// Variant data nested under a cart line.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemVariant {
    pub id: VariantId,
    pub sku: String,
    pub price: Decimal,
    pub product: CartItemProduct,
    pub images: Vec<CartItemImage>,
}

/// Product data nested under a cart line's variant.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemProduct {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub category: Option<Category>,
}

/// Image attached to a cart line's variant.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemImage {
    pub url: String,
    pub position: i32,
}

/// The `{cart, items, total}` payload returned by every cart endpoint.
///
/// `cart` is `None` when the identity has no cart yet; remove/clear on a
/// missing cart return this empty shape rather than an error.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub cart: Option<Cart>,
    pub items: Vec<CartItem>,
    pub total: Decimal,
}

impl CartView {
    /// Build a view, recomputing the total from the items.
    #[must_use]
    pub fn new(cart: Cart, items: Vec<CartItem>) -> Self {
        let total = items.iter().map(CartItem::line_total).sum();
        Self {
            cart: Some(cart),
            items,
            total,
        }
    }

    /// The empty-cart response shape.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            cart: None,
            items: Vec::new(),
            total: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(id: i32, price: &str, quantity: i32) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            quantity: Quantity::new(quantity).unwrap(),
            price: price.parse().unwrap(),
            variant: CartItemVariant {
                id: VariantId::new(id),
                sku: format!("SKU-{id}"),
                price: price.parse().unwrap(),
                product: CartItemProduct {
                    id: ProductId::new(id),
                    slug: format!("product-{id}"),
                    name: format!("Product {id}"),
                    category: None,
                },
                images: Vec::new(),
            },
        }
    }

    fn cart() -> Cart {
        Cart {
            id: CartId::new(1),
            user_id: None,
            session_token: Some("token".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn line_total_is_price_times_quantity() {
        assert_eq!(item(1, "19.99", 3).line_total(), dec("59.97"));
    }

    #[test]
    fn total_sums_all_lines() {
        let view = CartView::new(cart(), vec![item(1, "10.00", 2), item(2, "2.50", 4)]);
        assert_eq!(view.total, dec("30.00"));
    }

    #[test]
    fn empty_view_has_zero_total_and_no_cart() {
        let view = CartView::empty();
        assert!(view.cart.is_none());
        assert!(view.items.is_empty());
        assert_eq!(view.total, Decimal::ZERO);
    }

    #[test]
    fn cart_with_no_items_totals_zero() {
        let view = CartView::new(cart(), Vec::new());
        assert_eq!(view.total, Decimal::ZERO);
    }

    #[test]
    fn session_token_is_not_serialized() {
        let view = CartView::new(cart(), Vec::new());
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("session_token"));
        assert!(!json.contains("token"));
    }
}
