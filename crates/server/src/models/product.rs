//! Product and variant models.

use rust_decimal::Decimal;
use serde::Serialize;

use meridian_core::{CategoryId, ImageId, ProductId, VariantId};

use super::category::Category;

/// Catalog entity as listed on `/products`.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub short_description: Option<String>,
    pub manufacturer: Option<String>,
    pub category_id: Option<CategoryId>,
}

/// A purchasable SKU of a product.
///
/// `price` is the authoritative price at add-to-cart time; it is copied
/// into the cart item, not recomputed later.
#[derive(Debug, Clone, Serialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub sku: String,
    pub price: Decimal,
    pub position: i32,
    pub images: Vec<VariantImage>,
    pub attributes: Vec<VariantAttribute>,
}

/// Ordered image attached to a variant.
#[derive(Debug, Clone, Serialize)]
pub struct VariantImage {
    pub id: ImageId,
    pub url: String,
    pub position: i32,
}

/// Attribute value attached to a variant (e.g., `material_name`).
#[derive(Debug, Clone, Serialize)]
pub struct VariantAttribute {
    pub name: String,
    pub value: String,
}

/// Full product payload for the detail endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub category: Option<Category>,
    pub variants: Vec<ProductVariant>,
}
