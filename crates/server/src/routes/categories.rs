//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::db::CategoryRepository;
use crate::error::AppError;
use crate::models::category::{Category, CategoryDetail};
use crate::response::ApiResponse;
use crate::state::AppState;

/// List all categories.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Category>>>, AppError> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(ApiResponse::ok(categories))
}

/// Category detail with direct children.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<CategoryDetail>>, AppError> {
    let detail = CategoryRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;

    Ok(ApiResponse::ok(detail))
}
