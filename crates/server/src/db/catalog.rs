//! Catalog query builder over the denormalized product view.
//!
//! Translates the flat set of request filters into a single read-only
//! query against `vw_product_full_view`. The accepted filters are a
//! declarative table (parameter → column, comparison kind, cast), walked
//! once per request. The endpoint is permissive by design: unknown sort
//! keys are ignored, oversized page sizes are clamped, and malformed
//! numeric bounds are skipped - nothing is rejected outright.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::RepositoryError;
use crate::models::catalog::{CatalogPage, CatalogRow};

/// Default page size when `per_page` is absent.
const DEFAULT_PER_PAGE: i64 = 12;

/// Hard cap on page size to bound response sizes.
pub const MAX_PER_PAGE: i64 = 200;

/// Hard cap on the page index so the OFFSET arithmetic stays in range.
pub const MAX_PAGE: i64 = 1_000_000;

/// Columns matched by the free-text `search` parameter.
const SEARCH_COLUMNS: &[&str] = &[
    "product_name",
    "description",
    "manufacturer",
    "master_category",
    "subcat_name",
];

/// Sort keys accepted by `sort`, with the SQL expression each maps to.
/// `mrp` and `weight` are stored as text in the view and must be cast.
const SORT_COLUMNS: &[(&str, &str)] = &[
    ("product_name", "product_name"),
    ("mrp", "CAST(mrp AS NUMERIC)"),
    ("weight", "CAST(weight AS NUMERIC)"),
    ("master_category", "master_category"),
    ("series_name", "series_name"),
];

const SELECT_COLUMNS: &str = "SELECT detail_id, product_id, product_name, description, \
     manufacturer, master_category, subcat_name, category_id, series_name, material_name, \
     warranty_text, certification, net_quantity, mrp, weight, image \
     FROM vw_product_full_view";

type Getter = for<'a> fn(&'a CatalogQuery) -> Option<&'a str>;

/// One entry of the exact/in-list filter table.
struct ColumnFilter {
    column: &'static str,
    get: Getter,
}

/// Exact-match filters. A comma-separated value becomes a membership test.
const COLUMN_FILTERS: &[ColumnFilter] = &[
    ColumnFilter {
        column: "product_id",
        get: |q| q.product_id.as_deref(),
    },
    ColumnFilter {
        column: "category_id",
        get: |q| q.category_id.as_deref(),
    },
    ColumnFilter {
        column: "master_category",
        get: |q| q.master_category.as_deref(),
    },
    ColumnFilter {
        column: "subcat_name",
        get: |q| q.subcat_name.as_deref(),
    },
    ColumnFilter {
        column: "series_name",
        get: |q| q.series_name.as_deref(),
    },
    ColumnFilter {
        column: "material_name",
        get: |q| q.material_name.as_deref(),
    },
    ColumnFilter {
        column: "warranty_text",
        get: |q| q.warranty_text.as_deref(),
    },
    ColumnFilter {
        column: "certification",
        get: |q| q.certification.as_deref(),
    },
    ColumnFilter {
        column: "net_quantity",
        get: |q| q.net_quantity.as_deref(),
    },
];

/// One entry of the numeric-range filter table. The view stores these
/// columns as text, so comparisons go through a NUMERIC cast.
struct RangeFilter {
    column: &'static str,
    min: Getter,
    max: Getter,
}

const RANGE_FILTERS: &[RangeFilter] = &[
    RangeFilter {
        column: "mrp",
        min: |q| q.min_mrp.as_deref(),
        max: |q| q.max_mrp.as_deref(),
    },
    RangeFilter {
        column: "weight",
        min: |q| q.min_weight.as_deref(),
        max: |q| q.max_weight.as_deref(),
    },
];

/// Recognized query parameters for the filtered catalog listing.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub product_id: Option<String>,
    pub category_id: Option<String>,
    pub master_category: Option<String>,
    pub subcat_name: Option<String>,
    pub series_name: Option<String>,
    pub material_name: Option<String>,
    pub warranty_text: Option<String>,
    pub certification: Option<String>,
    pub net_quantity: Option<String>,
    pub min_mrp: Option<String>,
    pub max_mrp: Option<String>,
    pub min_weight: Option<String>,
    pub max_weight: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    // Kept as strings so a malformed value falls back to the default
    // instead of failing extraction for the whole request.
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl CatalogQuery {
    /// Requested page, clamped to `1..=MAX_PAGE`. Malformed values fall
    /// back to the first page.
    #[must_use]
    pub fn page(&self) -> i64 {
        non_blank(self.page.as_deref())
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(1)
            .clamp(1, MAX_PAGE)
    }

    /// Requested page size, clamped to `1..=MAX_PER_PAGE`. Malformed
    /// values fall back to the default.
    #[must_use]
    pub fn per_page(&self) -> i64 {
        non_blank(self.per_page.as_deref())
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }
}

/// Emits `WHERE` for the first clause and `AND` afterwards.
struct ClausePrefix {
    first: bool,
}

impl ClausePrefix {
    const fn new() -> Self {
        Self { first: true }
    }

    fn next(&mut self) -> &'static str {
        if self.first {
            self.first = false;
            " WHERE "
        } else {
            " AND "
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Walk the filter tables and push the `WHERE` clause onto `qb`.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &CatalogQuery) {
    let mut prefix = ClausePrefix::new();

    if let Some(term) = non_blank(query.search.as_deref()) {
        let pattern = format!("%{term}%");
        qb.push(prefix.next());
        qb.push("(");
        for (i, column) in SEARCH_COLUMNS.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(*column);
            qb.push(" ILIKE ");
            qb.push_bind(pattern.clone());
        }
        qb.push(")");
    }

    for filter in COLUMN_FILTERS {
        let Some(value) = non_blank((filter.get)(query)) else {
            continue;
        };
        qb.push(prefix.next());
        qb.push(filter.column);
        if value.contains(',') {
            qb.push(" IN (");
            {
                let mut separated = qb.separated(", ");
                for item in value.split(',').map(str::trim).filter(|v| !v.is_empty()) {
                    separated.push_bind(item.to_string());
                }
            }
            qb.push(")");
        } else {
            qb.push(" = ");
            qb.push_bind(value.to_string());
        }
    }

    for range in RANGE_FILTERS {
        if let Some(min) = non_blank((range.min)(query)).and_then(parse_decimal) {
            qb.push(prefix.next());
            qb.push("CAST(");
            qb.push(range.column);
            qb.push(" AS NUMERIC) >= ");
            qb.push_bind(min);
        }
        if let Some(max) = non_blank((range.max)(query)).and_then(parse_decimal) {
            qb.push(prefix.next());
            qb.push("CAST(");
            qb.push(range.column);
            qb.push(" AS NUMERIC) <= ");
            qb.push_bind(max);
        }
    }
}

/// Parse a numeric bound; malformed values are skipped, not rejected.
fn parse_decimal(value: &str) -> Option<Decimal> {
    value.parse().ok()
}

/// Build the paged row query.
fn build_page_query(query: &CatalogQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(SELECT_COLUMNS);
    push_filters(&mut qb, query);

    // Unrecognized sort keys are silently ignored - no ORDER BY is emitted.
    let sort = query.sort.as_deref().unwrap_or("product_name");
    if let Some((_, expr)) = SORT_COLUMNS.iter().find(|(key, _)| *key == sort) {
        let direction = match query.order.as_deref() {
            Some(order) if order.eq_ignore_ascii_case("desc") => "DESC",
            _ => "ASC",
        };
        qb.push(" ORDER BY ");
        qb.push(*expr);
        qb.push(" ");
        qb.push(direction);
    }

    let per_page = query.per_page();
    qb.push(" LIMIT ");
    qb.push_bind(per_page);
    qb.push(" OFFSET ");
    qb.push_bind((query.page() - 1) * per_page);
    qb
}

/// Build the matching total-count query.
fn build_count_query(query: &CatalogQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM vw_product_full_view");
    push_filters(&mut qb, query);
    qb
}

/// Read-only repository over the denormalized product view.
pub struct CatalogViewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogViewRepository<'a> {
    /// Create a new catalog view repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Run the filtered, sorted, paginated listing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn search(&self, query: &CatalogQuery) -> Result<CatalogPage, RepositoryError> {
        let mut count_qb = build_count_query(query);
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        let mut page_qb = build_page_query(query);
        let rows: Vec<CatalogRow> = page_qb.build_query_as().fetch_all(self.pool).await?;

        Ok(CatalogPage::new(rows, total, query.page(), query.per_page()))
    }

    /// Fetch a single row by detail id or product id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: i32) -> Result<Option<CatalogRow>, RepositoryError> {
        let row = sqlx::query_as::<_, CatalogRow>(&format!(
            "{SELECT_COLUMNS} WHERE detail_id = $1 OR product_id = $1 LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sql_for(query: &CatalogQuery) -> String {
        build_page_query(query).into_sql()
    }

    #[test]
    fn no_filters_selects_everything() {
        let sql = sql_for(&CatalogQuery::default());
        assert!(!sql.contains("WHERE"));
        assert!(sql.contains("ORDER BY product_name ASC"));
        assert!(sql.contains("LIMIT"));
    }

    #[test]
    fn search_matches_all_text_columns() {
        let query = CatalogQuery {
            search: Some("steel".to_string()),
            ..CatalogQuery::default()
        };
        let sql = sql_for(&query);
        for column in SEARCH_COLUMNS {
            assert!(sql.contains(&format!("{column} ILIKE")), "missing {column}");
        }
    }

    #[test]
    fn single_value_uses_equality() {
        let query = CatalogQuery {
            category_id: Some("7".to_string()),
            ..CatalogQuery::default()
        };
        let sql = sql_for(&query);
        assert!(sql.contains("category_id = "));
        assert!(!sql.contains("category_id IN"));
    }

    #[test]
    fn comma_separated_value_becomes_membership_test() {
        let query = CatalogQuery {
            category_id: Some("1,2,3".to_string()),
            ..CatalogQuery::default()
        };
        let sql = sql_for(&query);
        assert!(sql.contains("category_id IN ($1, $2, $3)"));
    }

    #[test]
    fn mrp_range_casts_before_comparing() {
        let query = CatalogQuery {
            min_mrp: Some("1000".to_string()),
            max_mrp: Some("5000".to_string()),
            ..CatalogQuery::default()
        };
        let sql = sql_for(&query);
        assert!(sql.contains("CAST(mrp AS NUMERIC) >= "));
        assert!(sql.contains("CAST(mrp AS NUMERIC) <= "));
    }

    #[test]
    fn malformed_numeric_bound_is_skipped() {
        let query = CatalogQuery {
            min_mrp: Some("cheap".to_string()),
            ..CatalogQuery::default()
        };
        let sql = sql_for(&query);
        assert!(!sql.contains("CAST(mrp"));
    }

    #[test]
    fn multiple_filters_join_with_and() {
        let query = CatalogQuery {
            search: Some("pan".to_string()),
            category_id: Some("2".to_string()),
            min_mrp: Some("100".to_string()),
            ..CatalogQuery::default()
        };
        let sql = sql_for(&query);
        assert_eq!(sql.matches(" WHERE ").count(), 1);
        assert_eq!(sql.matches(" AND ").count(), 2);
    }

    #[test]
    fn sort_by_mrp_goes_through_cast() {
        let query = CatalogQuery {
            sort: Some("mrp".to_string()),
            order: Some("desc".to_string()),
            ..CatalogQuery::default()
        };
        let sql = sql_for(&query);
        assert!(sql.contains("ORDER BY CAST(mrp AS NUMERIC) DESC"));
    }

    #[test]
    fn unknown_sort_key_is_silently_ignored() {
        let query = CatalogQuery {
            sort: Some("price; DROP TABLE products".to_string()),
            ..CatalogQuery::default()
        };
        let sql = sql_for(&query);
        assert!(!sql.contains("ORDER BY"));
        assert!(!sql.contains("DROP TABLE"));
    }

    #[test]
    fn order_defaults_to_ascending() {
        let query = CatalogQuery {
            sort: Some("product_name".to_string()),
            order: Some("sideways".to_string()),
            ..CatalogQuery::default()
        };
        assert!(sql_for(&query).contains("ORDER BY product_name ASC"));
    }

    #[test]
    fn per_page_is_clamped_to_maximum() {
        let query = CatalogQuery {
            per_page: Some("500".to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(query.per_page(), MAX_PER_PAGE);
    }

    #[test]
    fn per_page_defaults_and_floors() {
        assert_eq!(CatalogQuery::default().per_page(), DEFAULT_PER_PAGE);
        let query = CatalogQuery {
            per_page: Some("0".to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(query.per_page(), 1);
    }

    #[test]
    fn page_never_goes_below_one() {
        let query = CatalogQuery {
            page: Some("-3".to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn huge_page_is_clamped_and_builds() {
        let query = CatalogQuery {
            page: Some(i64::MAX.to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(query.page(), MAX_PAGE);
        // The OFFSET multiplication must stay in range.
        let sql = sql_for(&query);
        assert!(sql.contains("OFFSET"));
    }

    #[test]
    fn malformed_paging_falls_back_to_defaults() {
        let query = CatalogQuery {
            page: Some("abc".to_string()),
            per_page: Some("lots".to_string()),
            ..CatalogQuery::default()
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.per_page(), DEFAULT_PER_PAGE);
    }

    #[test]
    fn blank_filter_values_are_ignored() {
        let query = CatalogQuery {
            category_id: Some("   ".to_string()),
            search: Some(String::new()),
            ..CatalogQuery::default()
        };
        assert!(!sql_for(&query).contains("WHERE"));
    }
}
