//! Denormalized catalog view models.
//!
//! `CatalogRow` mirrors `vw_product_full_view` column-for-column. The view
//! stores `mrp` and `weight` as text; the query builder casts them before
//! comparing or sorting, and they are passed through to the client as-is.

use serde::Serialize;
use sqlx::FromRow;

/// One row of the denormalized product view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CatalogRow {
    pub detail_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub master_category: Option<String>,
    pub subcat_name: Option<String>,
    pub category_id: Option<i32>,
    pub series_name: Option<String>,
    pub material_name: Option<String>,
    pub warranty_text: Option<String>,
    pub certification: Option<String>,
    pub net_quantity: Option<String>,
    pub mrp: Option<String>,
    pub weight: Option<String>,
    pub image: Option<String>,
}

/// A page of catalog rows plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub items: Vec<CatalogRow>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl CatalogPage {
    /// Assemble a page, deriving `total_pages` from the count.
    #[must_use]
    pub fn new(items: Vec<CatalogRow>, total: i64, page: i64, per_page: i64) -> Self {
        // i64::div_ceil is not stable yet; both values are non-negative.
        let total_pages = (total + per_page - 1) / per_page;
        Self {
            items,
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        let page = CatalogPage::new(Vec::new(), 25, 1, 12);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let page = CatalogPage::new(Vec::new(), 0, 1, 12);
        assert_eq!(page.total_pages, 0);
    }
}
