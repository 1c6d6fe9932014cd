//! Cart mutation service.
//!
//! Each operation is a synchronous unit of work against one cart: resolve
//! the identity, mutate a single item row, then reload the cart with
//! nested variant → product → category data and recompute the total.
//!
//! Policy on a missing cart: `remove` and `clear` are idempotent no-ops
//! returning the empty-cart response; `update_quantity` is a 404 because
//! the caller is addressing a specific item that cannot exist.

use sqlx::PgPool;
use tracing::instrument;

use meridian_core::{CartItemId, Quantity, VariantId};

use crate::db::carts::CartIdentity;
use crate::db::{CartRepository, CartStore, RepositoryError};
use crate::error::AppError;
use crate::models::cart::{Cart, CartView};

/// Service wrapping all cart reads and mutations.
pub struct CartService<S> {
    repo: S,
}

impl<'a> CartService<CartRepository<'a>> {
    /// Create a new cart service over the `PostgreSQL` repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            repo: CartRepository::new(pool),
        }
    }
}

impl<S: CartStore> CartService<S> {
    #[cfg(test)]
    const fn with_store(repo: S) -> Self {
        Self { repo }
    }

    /// Fetch the cart for an identity. No cart yet means the empty shape,
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` on repository failure.
    #[instrument(skip(self))]
    pub async fn fetch(&self, identity: &CartIdentity) -> Result<CartView, AppError> {
        match self.repo.find(identity).await? {
            Some(cart) => self.present(cart).await,
            None => Ok(CartView::empty()),
        }
    }

    /// Add a variant to the cart, creating the cart on first add.
    ///
    /// Quantity accumulates across repeated adds of the same variant; the
    /// line never duplicates and never exceeds the per-line maximum. The
    /// variant's price is snapshotted into the item at this moment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown variant, or
    /// `AppError::Database` on repository failure.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        identity: &CartIdentity,
        variant_id: VariantId,
        quantity: Quantity,
    ) -> Result<CartView, AppError> {
        let Some(variant) = self.repo.variant_price(variant_id).await? else {
            return Err(AppError::NotFound(format!("variant {variant_id}")));
        };

        let cart = self.repo.find_or_create(identity).await?;
        self.repo
            .upsert_item(cart.id, variant_id, quantity, variant.price)
            .await?;

        self.present(cart).await
    }

    /// Overwrite an item's quantity.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the identity has no cart or the
    /// item does not belong to it, `AppError::Database` on repository
    /// failure.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        identity: &CartIdentity,
        item_id: CartItemId,
        quantity: Quantity,
    ) -> Result<CartView, AppError> {
        let Some(cart) = self.repo.find(identity).await? else {
            return Err(AppError::NotFound("cart empty".to_string()));
        };

        self.repo
            .set_item_quantity(cart.id, item_id, quantity)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AppError::NotFound(format!("item {item_id}")),
                other => AppError::Database(other),
            })?;

        self.present(cart).await
    }

    /// Remove an item. Missing cart or missing item is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` on repository failure.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        identity: &CartIdentity,
        item_id: CartItemId,
    ) -> Result<CartView, AppError> {
        let Some(cart) = self.repo.find(identity).await? else {
            return Ok(CartView::empty());
        };

        self.repo.delete_item(cart.id, item_id).await?;
        self.present(cart).await
    }

    /// Empty the cart. Missing cart is a no-op; clearing twice is fine.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` on repository failure.
    #[instrument(skip(self))]
    pub async fn clear(&self, identity: &CartIdentity) -> Result<CartView, AppError> {
        let Some(cart) = self.repo.find(identity).await? else {
            return Ok(CartView::empty());
        };

        self.repo.clear_items(cart.id).await?;
        self.present(cart).await
    }

    /// Reload the cart's items and recompute the total.
    async fn present(&self, cart: Cart) -> Result<CartView, AppError> {
        let items = self.repo.load_items(cart.id).await?;
        Ok(CartView::new(cart, items))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use meridian_core::{CartId, CartToken};

    use super::*;
    use crate::db::carts::VariantPrice;
    use crate::models::cart::CartItem;

    /// In-memory stand-in recording which mutations were attempted.
    struct FakeStore {
        cart: Option<Cart>,
        variant: Option<VariantPrice>,
        missing_item: bool,
        calls: RefCell<Vec<String>>,
        upserts: RefCell<Vec<(VariantId, Quantity, Decimal)>>,
    }

    impl FakeStore {
        fn empty() -> Self {
            Self {
                cart: None,
                variant: None,
                missing_item: false,
                calls: RefCell::new(Vec::new()),
                upserts: RefCell::new(Vec::new()),
            }
        }

        fn with_cart() -> Self {
            Self {
                cart: Some(sample_cart()),
                ..Self::empty()
            }
        }

        fn record(&self, call: &str) {
            self.calls.borrow_mut().push(call.to_string());
        }

        fn called(&self, call: &str) -> bool {
            self.calls.borrow().iter().any(|c| c == call)
        }
    }

    fn sample_cart() -> Cart {
        Cart {
            id: CartId::new(1),
            user_id: None,
            session_token: Some("token".to_string()),
            created_at: Utc::now(),
        }
    }

    fn identity() -> CartIdentity {
        CartIdentity {
            user_id: None,
            token: CartToken::from_string("token".to_string()),
        }
    }

    impl CartStore for FakeStore {
        async fn find(&self, _identity: &CartIdentity) -> Result<Option<Cart>, RepositoryError> {
            self.record("find");
            Ok(self.cart.clone())
        }

        async fn find_or_create(
            &self,
            _identity: &CartIdentity,
        ) -> Result<Cart, RepositoryError> {
            self.record("find_or_create");
            Ok(self.cart.clone().unwrap_or_else(sample_cart))
        }

        async fn variant_price(
            &self,
            _variant_id: VariantId,
        ) -> Result<Option<VariantPrice>, RepositoryError> {
            self.record("variant_price");
            Ok(self.variant.as_ref().map(|v| VariantPrice { price: v.price }))
        }

        async fn upsert_item(
            &self,
            _cart_id: CartId,
            variant_id: VariantId,
            quantity: Quantity,
            price: Decimal,
        ) -> Result<(), RepositoryError> {
            self.record("upsert_item");
            self.upserts.borrow_mut().push((variant_id, quantity, price));
            Ok(())
        }

        async fn set_item_quantity(
            &self,
            _cart_id: CartId,
            _item_id: CartItemId,
            _quantity: Quantity,
        ) -> Result<(), RepositoryError> {
            self.record("set_item_quantity");
            if self.missing_item {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        }

        async fn delete_item(
            &self,
            _cart_id: CartId,
            _item_id: CartItemId,
        ) -> Result<(), RepositoryError> {
            self.record("delete_item");
            Ok(())
        }

        async fn clear_items(&self, _cart_id: CartId) -> Result<(), RepositoryError> {
            self.record("clear_items");
            Ok(())
        }

        async fn load_items(&self, _cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError> {
            self.record("load_items");
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn remove_without_cart_is_a_noop() {
        let store = FakeStore::empty();
        let service = CartService::with_store(store);

        let view = service
            .remove(&identity(), CartItemId::new(7))
            .await
            .unwrap();

        assert!(view.cart.is_none());
        assert_eq!(view.total, Decimal::ZERO);
        assert!(!service.repo.called("delete_item"));
    }

    #[tokio::test]
    async fn clear_without_cart_is_a_noop() {
        let service = CartService::with_store(FakeStore::empty());

        let view = service.clear(&identity()).await.unwrap();

        assert!(view.cart.is_none());
        assert!(!service.repo.called("clear_items"));
    }

    #[tokio::test]
    async fn update_without_cart_is_not_found() {
        let service = CartService::with_store(FakeStore::empty());

        let err = service
            .update_quantity(&identity(), CartItemId::new(7), Quantity::ONE)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_of_missing_item_is_not_found() {
        let store = FakeStore {
            missing_item: true,
            ..FakeStore::with_cart()
        };
        let service = CartService::with_store(store);

        let err = service
            .update_quantity(&identity(), CartItemId::new(7), Quantity::ONE)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn add_snapshots_the_server_side_price() {
        let store = FakeStore {
            variant: Some(VariantPrice {
                price: "149.50".parse().unwrap(),
            }),
            ..FakeStore::with_cart()
        };
        let service = CartService::with_store(store);

        service
            .add(&identity(), VariantId::new(3), Quantity::new(2).unwrap())
            .await
            .unwrap();

        let upserts = service.repo.upserts.borrow();
        assert_eq!(
            upserts.as_slice(),
            &[(
                VariantId::new(3),
                Quantity::new(2).unwrap(),
                "149.50".parse().unwrap()
            )]
        );
    }

    #[tokio::test]
    async fn add_of_unknown_variant_is_not_found() {
        let service = CartService::with_store(FakeStore::with_cart());

        let err = service
            .add(&identity(), VariantId::new(3), Quantity::ONE)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!service.repo.called("upsert_item"));
    }
}
