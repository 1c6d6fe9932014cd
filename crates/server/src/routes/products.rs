//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::models::product::{Product, ProductDetail};
use crate::response::ApiResponse;
use crate::state::AppState;

const DEFAULT_PER_PAGE: i64 = 12;
const MAX_PER_PAGE: i64 = 200;

/// Cap on the page index so the OFFSET arithmetic stays in range.
const MAX_PAGE: i64 = 1_000_000;

/// Pagination query parameters. Malformed values fall back to defaults
/// rather than failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// Resolve `(page, per_page)` with out-of-range and malformed values
/// clamped to their defaults.
fn page_bounds(query: &PaginationQuery) -> (i64, i64) {
    let page = query
        .page
        .as_deref()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_PAGE);
    let per_page = query
        .per_page
        .as_deref()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    (page, per_page)
}

/// Paginated product listing payload.
#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// Product listing, paginated.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<ProductPage>>, AppError> {
    let (page, per_page) = page_bounds(&query);

    let (items, total) = ProductRepository::new(state.pool())
        .list(page, per_page)
        .await?;

    let total_pages = (total + per_page - 1) / per_page;

    Ok(ApiResponse::ok(ProductPage {
        items,
        total,
        page,
        per_page,
        total_pages,
    }))
}

/// Product detail with variants, images, and attributes.
///
/// Variant image URLs are presigned before leaving the API.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ProductDetail>>, AppError> {
    let mut detail = ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    for variant in &mut detail.variants {
        for image in &mut variant.images {
            image.url = state.signer().sign(&image.url);
        }
    }

    Ok(ApiResponse::ok(detail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds_defaults() {
        assert_eq!(
            page_bounds(&PaginationQuery::default()),
            (1, DEFAULT_PER_PAGE)
        );
    }

    #[test]
    fn page_bounds_clamps_extremes() {
        let query = PaginationQuery {
            page: Some(i64::MAX.to_string()),
            per_page: Some("500".to_string()),
        };
        assert_eq!(page_bounds(&query), (MAX_PAGE, MAX_PER_PAGE));
    }

    #[test]
    fn page_bounds_ignores_malformed_values() {
        let query = PaginationQuery {
            page: Some("first".to_string()),
            per_page: Some("-9".to_string()),
        };
        assert_eq!(page_bounds(&query), (1, 1));
    }
}
