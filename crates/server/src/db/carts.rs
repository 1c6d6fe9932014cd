//! Cart repository.
//!
//! Resolution queries by either identity key; partial unique indexes on
//! `carts.user_id` and `carts.session_token` guarantee at most one row per
//! key. The add path is a single upsert-increment statement so concurrent
//! adds of the same variant cannot lose updates.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use meridian_core::{
    CartId, CartItemId, CartToken, CategoryId, ProductId, Quantity, UserId, VariantId,
};

use super::RepositoryError;
use crate::models::cart::{Cart, CartItem, CartItemImage, CartItemProduct, CartItemVariant};
use crate::models::category::Category;

/// The identity a cart is resolved by: an authenticated user, or failing
/// that, the session's anonymous cart token. Both come from server-managed
/// session state - never from client-supplied fields.
#[derive(Debug, Clone)]
pub struct CartIdentity {
    pub user_id: Option<UserId>,
    pub token: CartToken,
}

/// The authoritative variant price as needed by the add path.
#[derive(Debug, sqlx::FromRow)]
pub struct VariantPrice {
    pub price: Decimal,
}

/// Internal row type for cart queries.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: i32,
    user_id: Option<i32>,
    session_token: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: CartId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            session_token: row.session_token,
            created_at: row.created_at,
        }
    }
}

/// Internal row type for the nested item reload.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: i32,
    quantity: i32,
    price: Decimal,
    variant_id: i32,
    sku: String,
    variant_price: Decimal,
    product_id: i32,
    product_slug: String,
    product_name: String,
    category_id: Option<i32>,
    category_slug: Option<String>,
    category_name: Option<String>,
    category_parent_id: Option<i32>,
    category_created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct CartImageRow {
    variant_id: i32,
    url: String,
    position: i32,
}

/// Resolution prefers a user-owned cart over a token-owned one when the
/// identity matches both.
const FIND_CART: &str = "SELECT id, user_id, session_token, created_at FROM carts
     WHERE user_id = $1 OR session_token = $2
     ORDER BY (user_id IS NOT NULL) DESC, id
     LIMIT 1";

/// Upserts on the session token so a concurrent first-add race resolves
/// to one row.
const INSERT_CART: &str = "INSERT INTO carts (user_id, session_token)
     VALUES ($1, $2)
     ON CONFLICT (session_token) WHERE session_token IS NOT NULL
     DO UPDATE SET updated_at = now()
     RETURNING id, user_id, session_token, created_at";

/// Merge-on-add in one statement; the increment saturates at the line
/// maximum so the table CHECK can never be violated by repeated adds.
const UPSERT_ITEM: &str = "INSERT INTO cart_items (cart_id, product_variant_id, quantity, price)
     VALUES ($1, $2, $3, $4)
     ON CONFLICT (cart_id, product_variant_id)
     DO UPDATE SET quantity = LEAST(cart_items.quantity + EXCLUDED.quantity, 99),
                   updated_at = now()";

/// Scoped to the cart so one identity can never delete another's line.
const DELETE_ITEM: &str = "DELETE FROM cart_items WHERE id = $1 AND cart_id = $2";

/// The cart storage operations the service layer depends on. Implemented
/// by [`CartRepository`]; tests substitute an in-memory double.
pub trait CartStore {
    /// Find the cart for an identity, if any.
    ///
    /// When both a user-owned and a token-owned cart exist the user-owned
    /// one wins, deterministically.
    async fn find(&self, identity: &CartIdentity) -> Result<Option<Cart>, RepositoryError>;

    /// Find the cart for an identity, creating an empty one if none exists.
    async fn find_or_create(&self, identity: &CartIdentity) -> Result<Cart, RepositoryError>;

    /// Look up a variant's authoritative price for the add path.
    async fn variant_price(
        &self,
        variant_id: VariantId,
    ) -> Result<Option<VariantPrice>, RepositoryError>;

    /// Atomic merge-on-add: insert the line, or increment the existing one.
    async fn upsert_item(
        &self,
        cart_id: CartId,
        variant_id: VariantId,
        quantity: Quantity,
        price: Decimal,
    ) -> Result<(), RepositoryError>;

    /// Overwrite an item's quantity. The item must belong to the cart.
    async fn set_item_quantity(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        quantity: Quantity,
    ) -> Result<(), RepositoryError>;

    /// Delete an item if it belongs to the cart. Deleting an absent item
    /// is not an error.
    async fn delete_item(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
    ) -> Result<(), RepositoryError>;

    /// Delete all items in a cart, leaving the empty cart row behind.
    async fn clear_items(&self, cart_id: CartId) -> Result<(), RepositoryError>;

    /// Reload a cart's items with nested variant → product → category and
    /// variant → image data.
    async fn load_items(&self, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError>;
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl CartStore for CartRepository<'_> {
    async fn find(&self, identity: &CartIdentity) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(FIND_CART)
            .bind(identity.user_id.map(UserId::as_i32))
            .bind(identity.token.as_str())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Cart::from))
    }

    /// Session-token races are absorbed by the insert's conflict clause;
    /// a race on the user's unique index (two first-adds from different
    /// sessions of the same user) loses the insert and falls back to
    /// re-reading the winner's row.
    async fn find_or_create(&self, identity: &CartIdentity) -> Result<Cart, RepositoryError> {
        if let Some(cart) = self.find(identity).await? {
            return Ok(cart);
        }

        let inserted = sqlx::query_as::<_, CartRow>(INSERT_CART)
            .bind(identity.user_id.map(UserId::as_i32))
            .bind(identity.token.as_str())
            .fetch_one(self.pool)
            .await;

        match inserted {
            Ok(row) => Ok(Cart::from(row)),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => self
                .find(identity)
                .await?
                .ok_or(RepositoryError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn variant_price(
        &self,
        variant_id: VariantId,
    ) -> Result<Option<VariantPrice>, RepositoryError> {
        let row =
            sqlx::query_as::<_, VariantPrice>("SELECT price FROM product_variants WHERE id = $1")
        .bind(variant_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    async fn upsert_item(
        &self,
        cart_id: CartId,
        variant_id: VariantId,
        quantity: Quantity,
        price: Decimal,
    ) -> Result<(), RepositoryError> {
        sqlx::query(UPSERT_ITEM)
            .bind(cart_id.as_i32())
            .bind(variant_id.as_i32())
            .bind(quantity.as_i32())
            .bind(price)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Zero rows affected means the item is not in this cart.
    async fn set_item_quantity(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        quantity: Quantity,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE cart_items SET quantity = $3, updated_at = now()
             WHERE id = $1 AND cart_id = $2",
        )
        .bind(item_id.as_i32())
        .bind(cart_id.as_i32())
        .bind(quantity.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_item(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(DELETE_ITEM)
            .bind(item_id.as_i32())
            .bind(cart_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    async fn clear_items(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// A stored quantity outside the valid range is surfaced as
    /// `RepositoryError::DataCorruption`.
    async fn load_items(&self, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            "SELECT ci.id, ci.quantity, ci.price,
                    v.id AS variant_id, v.sku, v.price AS variant_price,
                    p.id AS product_id, p.slug AS product_slug, p.name AS product_name,
                    c.id AS category_id, c.slug AS category_slug, c.name AS category_name,
                    c.parent_id AS category_parent_id, c.created_at AS category_created_at
             FROM cart_items ci
             JOIN product_variants v ON v.id = ci.product_variant_id
             JOIN products p ON p.id = v.product_id
             LEFT JOIN categories c ON c.id = p.category_id
             WHERE ci.cart_id = $1
             ORDER BY ci.id",
        )
        .bind(cart_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        let variant_ids: Vec<i32> = rows.iter().map(|r| r.variant_id).collect();
        let mut images = self.load_images(&variant_ids).await?;

        rows.into_iter()
            .map(|row| {
                let quantity = Quantity::new(row.quantity).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid quantity in database: {e}"))
                })?;

                let category = match (row.category_id, row.category_slug, row.category_name) {
                    (Some(id), Some(slug), Some(name)) => Some(Category {
                        id: CategoryId::new(id),
                        slug,
                        name,
                        parent_id: row.category_parent_id.map(CategoryId::new),
                        created_at: row.category_created_at.unwrap_or_else(Utc::now),
                    }),
                    _ => None,
                };

                Ok(CartItem {
                    id: CartItemId::new(row.id),
                    quantity,
                    price: row.price,
                    variant: CartItemVariant {
                        id: VariantId::new(row.variant_id),
                        sku: row.sku,
                        price: row.variant_price,
                        product: CartItemProduct {
                            id: ProductId::new(row.product_id),
                            slug: row.product_slug,
                            name: row.product_name,
                            category,
                        },
                        images: images.remove(&row.variant_id).unwrap_or_default(),
                    },
                })
            })
            .collect()
    }
}

impl CartRepository<'_> {
    /// Batched image fetch for the variants in a cart.
    async fn load_images(
        &self,
        variant_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<CartItemImage>>, RepositoryError> {
        if variant_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, CartImageRow>(
            "SELECT variant_id, url, position
             FROM variant_images
             WHERE variant_id = ANY($1)
             ORDER BY variant_id, position",
        )
        .bind(variant_ids)
        .fetch_all(self.pool)
        .await?;

        let mut images: HashMap<i32, Vec<CartItemImage>> = HashMap::new();
        for row in rows {
            images.entry(row.variant_id).or_default().push(CartItemImage {
                url: row.url,
                position: row.position,
            });
        }
        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_prefers_the_user_cart() {
        assert!(FIND_CART.contains("ORDER BY (user_id IS NOT NULL) DESC, id"));
        assert!(FIND_CART.contains("LIMIT 1"));
    }

    #[test]
    fn cart_insert_absorbs_session_token_races() {
        assert!(INSERT_CART.contains("ON CONFLICT (session_token) WHERE session_token IS NOT NULL"));
        assert!(INSERT_CART.contains("RETURNING id, user_id, session_token, created_at"));
    }

    #[test]
    fn merge_on_add_is_a_single_saturating_upsert() {
        assert!(UPSERT_ITEM.contains("ON CONFLICT (cart_id, product_variant_id)"));
        assert!(UPSERT_ITEM.contains("LEAST(cart_items.quantity + EXCLUDED.quantity, 99)"));
    }

    #[test]
    fn item_delete_is_scoped_to_the_cart() {
        assert!(DELETE_ITEM.contains("id = $1"));
        assert!(DELETE_ITEM.contains("cart_id = $2"));
    }
}
