//! # Query Builder
//!
//! [`build_query`] turns a [`FilterState`] into the [`QueryDescriptor`] the catalog
//! understands. It is a pure function: the same state always yields the same descriptor.
//!
//! The descriptor serializes straight into the API's short query keys
//! (`k`, `avgscr`, `minq`, ...); unset fields are left out of the URL entirely.

use crate::model::TagId;
use crate::query::FilterState;
use serde::{Serialize, Serializer};

/// Minimum average score behind the "popular" checkbox on the product list.
pub const LIST_POPULAR_MIN_SCORE: f64 = 3.5;

/// Minimum average score of the home page's popular carousel.
// Stricter than LIST_POPULAR_MIN_SCORE; the two are not unified.
pub const HOME_POPULAR_MIN_SCORE: f64 = 4.0;

/// "Low stock" is the inclusive quantity range [1, 4]; sold-out items are excluded.
pub const LOW_STOCK_MIN_QTY: u32 = 1;
pub const LOW_STOCK_MAX_QTY: u32 = 4;

/// Normalized parameters of a product search.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryDescriptor {
    #[serde(rename = "k", skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(rename = "avgscr", skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    #[serde(rename = "minq", skip_serializing_if = "Option::is_none")]
    pub min_qty: Option<u32>,
    #[serde(rename = "maxq", skip_serializing_if = "Option::is_none")]
    pub max_qty: Option<u32>,
    #[serde(rename = "offr", skip_serializing_if = "Option::is_none")]
    pub has_offer: Option<bool>,
    #[serde(rename = "pmt", skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    #[serde(rename = "plt", skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
    #[serde(
        rename = "tags",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_tag_csv"
    )]
    pub tag_ids: Option<Vec<TagId>>,
    #[serde(rename = "p", skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(rename = "lim", skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(rename = "offst", skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

fn serialize_tag_csv<S: Serializer>(ids: &Option<Vec<TagId>>, serializer: S) -> Result<S::Ok, S::Error> {
    match ids {
        Some(ids) => serializer.serialize_str(&join_tag_ids(ids)),
        None => serializer.serialize_none(),
    }
}

/// Comma-joined tag ids, e.g. `"3,8,12"`.
pub fn join_tag_ids(ids: &[TagId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Maps the product list filter to catalog query parameters.
pub fn build_query(state: &FilterState) -> QueryDescriptor {
    let tag_ids: Vec<TagId> = state.tags.iter().map(|t| t.id).collect();

    QueryDescriptor {
        keyword: (!state.keyword.is_empty()).then(|| state.keyword.clone()),
        min_score: state.show_popular.then_some(LIST_POPULAR_MIN_SCORE),
        min_qty: state.show_low_stock.then_some(LOW_STOCK_MIN_QTY),
        max_qty: state.show_low_stock.then_some(LOW_STOCK_MAX_QTY),
        has_offer: state.show_offers.then_some(true),
        price_min: state.min_price,
        price_max: state.max_price,
        tag_ids: (!tag_ids.is_empty()).then_some(tag_ids),
        page: Some(state.page),
        limit: None,
        offset: None,
    }
}

/// Home page carousel of well-reviewed products.
pub fn home_popular_query() -> QueryDescriptor {
    QueryDescriptor {
        min_score: Some(HOME_POPULAR_MIN_SCORE),
        ..QueryDescriptor::default()
    }
}

/// Home page strip of the first four products on offer.
pub fn home_offers_query() -> QueryDescriptor {
    QueryDescriptor {
        has_offer: Some(true),
        limit: Some(4),
        offset: Some(0),
        ..QueryDescriptor::default()
    }
}

/// Parameters of the tag auto-complete lookup (`/product/tag`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagSearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "p", skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(rename = "offst", skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(rename = "lim", skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl TagSearchQuery {
    /// First `limit` tags whose name matches `name`.
    pub fn by_name(name: impl Into<String>, limit: u32) -> Self {
        Self {
            name: Some(name.into()),
            page: None,
            offset: Some(0),
            limit: Some(limit),
        }
    }
}

/// Parameters of a comment page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommentPageQuery {
    #[serde(rename = "p")]
    pub page: u32,
}
