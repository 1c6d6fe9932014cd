//! Cart route handlers.
//!
//! Cart identity comes from the server-managed session: the authenticated
//! user id when present, otherwise an anonymous cart token generated on
//! first access and stored in the session. Request bodies never carry
//! identity.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use meridian_core::{CartItemId, CartToken, Quantity, UserId, VariantId};

use crate::db::carts::CartIdentity;
use crate::error::AppError;
use crate::models::cart::CartView;
use crate::models::session_keys;
use crate::response::ApiResponse;
use crate::services::CartService;
use crate::state::AppState;

/// Resolve the cart identity from the session.
///
/// Generates and persists an anonymous cart token on first access so the
/// same visitor keeps finding the same cart.
async fn identity(session: &Session) -> Result<CartIdentity, AppError> {
    let user_id = session
        .get::<UserId>(session_keys::CURRENT_USER_ID)
        .await?;

    let token = match session.get::<String>(session_keys::CART_TOKEN).await? {
        Some(token) => CartToken::from_string(token),
        None => {
            let token = CartToken::generate();
            session
                .insert(session_keys::CART_TOKEN, token.as_str())
                .await?;
            token
        }
    };

    Ok(CartIdentity { user_id, token })
}

/// Add to cart request body. The price is looked up server-side from the
/// variant, never taken from the client.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_variant_id: i32,
    pub quantity: Option<i32>,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

/// Fetch the cart.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ApiResponse<CartView>>, AppError> {
    let identity = identity(&session).await?;
    let view = CartService::new(state.pool()).fetch(&identity).await?;
    Ok(ApiResponse::ok(view))
}

/// Add a variant to the cart, creating the cart on first add.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<ApiResponse<CartView>>, AppError> {
    let quantity = Quantity::new(body.quantity.unwrap_or(1))?;
    let identity = identity(&session).await?;

    let view = CartService::new(state.pool())
        .add(&identity, VariantId::new(body.product_variant_id), quantity)
        .await?;

    Ok(ApiResponse::ok_with("item added", view))
}

/// Overwrite an item's quantity.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(item_id): Path<i32>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Json<ApiResponse<CartView>>, AppError> {
    let quantity = Quantity::new(body.quantity)?;
    let identity = identity(&session).await?;

    let view = CartService::new(state.pool())
        .update_quantity(&identity, CartItemId::new(item_id), quantity)
        .await?;

    Ok(ApiResponse::ok_with("quantity updated", view))
}

/// Remove an item from the cart. Idempotent: a missing cart or item
/// returns the (empty) cart rather than an error.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(item_id): Path<i32>,
) -> Result<Json<ApiResponse<CartView>>, AppError> {
    let identity = identity(&session).await?;

    let view = CartService::new(state.pool())
        .remove(&identity, CartItemId::new(item_id))
        .await?;

    Ok(ApiResponse::ok_with("item removed", view))
}

/// Empty the cart. Idempotent.
#[instrument(skip(state, session))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ApiResponse<CartView>>, AppError> {
    let identity = identity(&session).await?;
    let view = CartService::new(state.pool()).clear(&identity).await?;
    Ok(ApiResponse::ok_with("cart cleared", view))
}
