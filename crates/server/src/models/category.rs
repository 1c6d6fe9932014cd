//! Category models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use meridian_core::CategoryId;

/// A node in the category tree.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub slug: String,
    pub name: String,
    pub parent_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
}

/// A category together with its direct children, for the detail endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<Category>,
}
