//! Product repository.
//!
//! The detail query assembles the nested product → variants → images and
//! attributes shape in three round trips: one for the product, one for its
//! variants, and one batched fetch for images and attributes keyed by the
//! variant ids.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use meridian_core::{CategoryId, ImageId, ProductId, VariantId};

use super::RepositoryError;
use crate::models::category::Category;
use crate::models::product::{
    Product, ProductDetail, ProductVariant, VariantAttribute, VariantImage,
};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    slug: String,
    name: String,
    short_description: Option<String>,
    description: Option<String>,
    manufacturer: Option<String>,
    category_id: Option<i32>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            slug: row.slug,
            name: row.name,
            short_description: row.short_description,
            manufacturer: row.manufacturer,
            category_id: row.category_id.map(CategoryId::new),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    id: i32,
    product_id: i32,
    sku: String,
    price: Decimal,
    position: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    id: i32,
    variant_id: i32,
    url: String,
    position: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct AttributeRow {
    variant_id: i32,
    name: String,
    value: String,
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    slug: String,
    name: String,
    parent_id: Option<i32>,
    created_at: DateTime<Utc>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, paginated, newest first. Returns the page and the
    /// total row count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;

        let offset = (page - 1) * per_page;
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, slug, name, short_description, description, manufacturer, category_id
             FROM products
             ORDER BY id DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok((rows.into_iter().map(Product::from).collect(), total))
    }

    /// Get a product by slug with nested variants, images, and attributes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<ProductDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, slug, name, short_description, description, manufacturer, category_id
             FROM products
             WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let category = match row.category_id {
            Some(category_id) => sqlx::query_as::<_, CategoryRow>(
                "SELECT id, slug, name, parent_id, created_at FROM categories WHERE id = $1",
            )
            .bind(category_id)
            .fetch_optional(self.pool)
            .await?
            .map(|c| Category {
                id: CategoryId::new(c.id),
                slug: c.slug,
                name: c.name,
                parent_id: c.parent_id.map(CategoryId::new),
                created_at: c.created_at,
            }),
            None => None,
        };

        let variant_rows = sqlx::query_as::<_, VariantRow>(
            "SELECT id, product_id, sku, price, position
             FROM product_variants
             WHERE product_id = $1
             ORDER BY position, id",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?;

        let variant_ids: Vec<i32> = variant_rows.iter().map(|v| v.id).collect();
        let (mut images, mut attributes) = self.load_variant_extras(&variant_ids).await?;

        let variants = variant_rows
            .into_iter()
            .map(|v| ProductVariant {
                id: VariantId::new(v.id),
                product_id: ProductId::new(v.product_id),
                sku: v.sku,
                price: v.price,
                position: v.position,
                images: images.remove(&v.id).unwrap_or_default(),
                attributes: attributes.remove(&v.id).unwrap_or_default(),
            })
            .collect();

        Ok(Some(ProductDetail {
            id: ProductId::new(row.id),
            slug: row.slug,
            name: row.name,
            short_description: row.short_description,
            description: row.description,
            manufacturer: row.manufacturer,
            category,
            variants,
        }))
    }

    /// Batched fetch of images and attributes for a set of variants.
    async fn load_variant_extras(
        &self,
        variant_ids: &[i32],
    ) -> Result<
        (
            HashMap<i32, Vec<VariantImage>>,
            HashMap<i32, Vec<VariantAttribute>>,
        ),
        RepositoryError,
    > {
        if variant_ids.is_empty() {
            return Ok((HashMap::new(), HashMap::new()));
        }

        let image_rows = sqlx::query_as::<_, ImageRow>(
            "SELECT id, variant_id, url, position
             FROM variant_images
             WHERE variant_id = ANY($1)
             ORDER BY variant_id, position",
        )
        .bind(variant_ids)
        .fetch_all(self.pool)
        .await?;

        let attribute_rows = sqlx::query_as::<_, AttributeRow>(
            "SELECT variant_id, name, value
             FROM variant_attributes
             WHERE variant_id = ANY($1)
             ORDER BY variant_id, name",
        )
        .bind(variant_ids)
        .fetch_all(self.pool)
        .await?;

        let mut images: HashMap<i32, Vec<VariantImage>> = HashMap::new();
        for img in image_rows {
            images.entry(img.variant_id).or_default().push(VariantImage {
                id: ImageId::new(img.id),
                url: img.url,
                position: img.position,
            });
        }

        let mut attributes: HashMap<i32, Vec<VariantAttribute>> = HashMap::new();
        for attr in attribute_rows {
            attributes
                .entry(attr.variant_id)
                .or_default()
                .push(VariantAttribute {
                    name: attr.name,
                    value: attr.value,
                });
        }

        Ok((images, attributes))
    }
}
