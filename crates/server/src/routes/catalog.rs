//! Denormalized catalog view route handlers.
//!
//! These endpoints are read-only and permissive: unknown sort keys are
//! ignored and oversized page sizes clamped, never rejected. Image
//! references are rewritten to presigned URLs on the way out.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;

use crate::db::CatalogViewRepository;
use crate::db::catalog::CatalogQuery;
use crate::error::AppError;
use crate::models::catalog::{CatalogPage, CatalogRow};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Filtered, sorted, paginated listing over the product view.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<ApiResponse<CatalogPage>>, AppError> {
    let mut page = CatalogViewRepository::new(state.pool())
        .search(&query)
        .await?;

    for row in &mut page.items {
        state.signer().sign_in_place(&mut row.image);
    }

    Ok(ApiResponse::ok(page))
}

/// Single denormalized row by detail id or product id.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CatalogRow>>, AppError> {
    let mut row = CatalogViewRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product view row {id}")))?;

    state.signer().sign_in_place(&mut row.image);

    Ok(ApiResponse::ok(row))
}
