//! Category repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use meridian_core::CategoryId;

use super::RepositoryError;
use crate::models::category::{Category, CategoryDetail};

/// Internal row type for category queries.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    slug: String,
    name: String,
    parent_id: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            slug: row.slug,
            name: row.name,
            parent_id: row.parent_id.map(CategoryId::new),
            created_at: row.created_at,
        }
    }
}

const SELECT_CATEGORY: &str = "SELECT id, slug, name, parent_id, created_at FROM categories";

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories, roots first, then alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "{SELECT_CATEGORY} ORDER BY parent_id NULLS FIRST, name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Get a category by slug, with its direct children.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<CategoryDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!("{SELECT_CATEGORY} WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let category = Category::from(row);

        let children = sqlx::query_as::<_, CategoryRow>(&format!(
            "{SELECT_CATEGORY} WHERE parent_id = $1 ORDER BY name"
        ))
        .bind(category.id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(Some(CategoryDetail {
            category,
            children: children.into_iter().map(Category::from).collect(),
        }))
    }
}
