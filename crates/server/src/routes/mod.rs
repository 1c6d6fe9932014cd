//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (DB ping)
//!
//! # Categories
//! GET  /categories             - List categories
//! GET  /categories/{slug}      - Category detail with children
//!
//! # Products
//! GET  /products               - Product listing, paginated
//! GET  /products/{slug}        - Product detail
//! GET  /products/view          - Filtered listing over the denormalized view
//! GET  /products/view/{id}     - Single denormalized row
//!
//! # Cart (identity comes from the session)
//! GET  /cart                   - Fetch cart
//! POST /cart/add               - Add variant (merge-on-add)
//! POST /cart/update/{item_id}  - Overwrite item quantity
//! GET/POST /cart/remove/{item_id} - Remove item (idempotent)
//! POST /cart/clear             - Empty cart (idempotent)
//! ```

pub mod cart;
pub mod catalog;
pub mod categories;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{slug}", get(categories::show))
}

/// Create the product routes router.
///
/// The static `view` segment takes precedence over the `{slug}` capture.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/view", get(catalog::index))
        .route("/view/{id}", get(catalog::show))
        .route("/{slug}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update/{item_id}", post(cart::update))
        .route("/remove/{item_id}", get(cart::remove).post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
}
