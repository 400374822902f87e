//! Products as served by the catalog API.
//!
//! Two projections exist:
//! - [`ProductSummary`] - one row of a listing (`/product`), with the aggregates a card needs.
//! - [`ProductDetail`] - the extended view (`/product/{id}/extended`) with specs, tags,
//!   variants, attributes and every image.
//!
//! Both are read-only. Derived values (effective price, image split, stock flags) are
//! computed by methods, never stored.

use super::TagRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Quantities below this are shown as "low stock" on product cards.
pub const LOW_STOCK_BELOW: u32 = 5;

/// Type-safe identifier for Products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOffer {
    pub id: u64,
    /// Fraction of the price taken off, e.g. `0.15` for 15%.
    pub discount: f64,
    pub expire_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub product_id: ProductId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCategory {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub image_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub parent_category_id: Option<u64>,
}

/// A category with its ancestor chain, innermost first.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithParents {
    #[serde(flatten)]
    pub category: ProductCategory,
    #[serde(default)]
    pub parent_category: Option<Box<CategoryWithParents>>,
}

impl CategoryWithParents {
    /// Category names from the root down to this category.
    pub fn breadcrumb(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut node = Some(self);
        while let Some(current) = node {
            names.push(current.category.name.as_str());
            node = current.parent_category.as_deref();
        }
        names.reverse();
        names
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: u64,
    pub image_name: String,
    pub is_main: bool,
    pub product_id: ProductId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSpec {
    pub id: u64,
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub product_id: Option<ProductId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeOption {
    pub id: u64,
    pub value: String,
    #[serde(default)]
    pub attribute_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeWithOptions {
    pub id: u64,
    pub label: String,
    #[serde(default)]
    pub options: Vec<AttributeOption>,
}

/// The option a variant (or a shopper) picked for one attribute.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedAttribute {
    pub id: u64,
    pub label: String,
    pub selected_option: AttributeOption,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: u64,
    pub quantity: u32,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub attribute_set: Vec<SelectedAttribute>,
}

/// One row of a product listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub subcategory_id: u64,
    #[serde(default)]
    pub subcategory: Option<ProductCategory>,
    #[serde(default)]
    pub average_score: f64,
    #[serde(default)]
    pub total_quantity: u32,
    #[serde(default)]
    pub offer: Option<ProductOffer>,
    #[serde(default)]
    pub main_image: Option<ProductImage>,
    #[serde(default)]
    pub store: Option<StoreInfo>,
}

fn default_active() -> bool {
    true
}

impl ProductSummary {
    pub fn is_out_of_stock(&self) -> bool {
        self.total_quantity == 0
    }

    /// Cards flag anything under [`LOW_STOCK_BELOW`], including zero.
    pub fn is_low_stock(&self) -> bool {
        self.total_quantity < LOW_STOCK_BELOW
    }

    /// The offer discount, or `0.0` without an offer.
    pub fn discount(&self) -> f64 {
        self.offer.as_ref().map_or(0.0, |o| o.discount)
    }
}

/// The extended product, as shown on the detail page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub subcategory_id: u64,
    pub subcategory: CategoryWithParents,
    #[serde(default)]
    pub specs: Vec<ProductSpec>,
    #[serde(default)]
    pub tags: Vec<TagRef>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub attributes: Vec<AttributeWithOptions>,
    #[serde(default)]
    pub offer: Option<ProductOffer>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub store: Option<StoreInfo>,
}

impl ProductDetail {
    /// The first image flagged as main.
    pub fn main_image(&self) -> Option<&ProductImage> {
        self.images.iter().find(|i| i.is_main)
    }

    /// Every image that is not flagged as main, in server order.
    pub fn secondary_images(&self) -> Vec<&ProductImage> {
        self.images.iter().filter(|i| !i.is_main).collect()
    }

    /// Price after the offer discount, when there is a positive one.
    pub fn effective_price(&self) -> f64 {
        match &self.offer {
            Some(offer) if offer.discount > 0.0 => self.price * (1.0 - offer.discount),
            _ => self.price,
        }
    }

    /// The variant selected when the page opens.
    pub fn default_variant(&self) -> Option<&ProductVariant> {
        self.variants.first()
    }
}
