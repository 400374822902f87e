//! # Filter State
//!
//! What the shopper has asked for on the product list page. The search controller
//! owns the only live copy; every change goes through [`FilterState::apply`], which
//! returns a whole new state.

use crate::model::TagRef;

/// Search and filter inputs of the product list.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub keyword: String,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Selected tags, in selection order, unique by id.
    pub tags: Vec<TagRef>,
    pub show_low_stock: bool,
    pub show_offers: bool,
    pub show_popular: bool,
    /// 1-based result page.
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            min_price: None,
            max_price: None,
            tags: Vec::new(),
            show_low_stock: false,
            show_offers: false,
            show_popular: false,
            page: 1,
        }
    }
}

/// One discrete edit of the filter, as emitted by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChange {
    Keyword(String),
    MinPrice(Option<f64>),
    MaxPrice(Option<f64>),
    Tags(Vec<TagRef>),
    ShowLowStock(bool),
    ShowOffers(bool),
    ShowPopular(bool),
}

impl FilterState {
    /// Returns the state with `change` applied. `self` is left untouched.
    ///
    /// The current page is kept; page moves are a separate, range-checked operation
    /// on the search controller.
    pub fn apply(&self, change: FilterChange) -> FilterState {
        let mut next = self.clone();
        match change {
            FilterChange::Keyword(keyword) => next.keyword = keyword,
            FilterChange::MinPrice(price) => next.min_price = price,
            FilterChange::MaxPrice(price) => next.max_price = price,
            FilterChange::Tags(tags) => next.tags = dedup_tags(tags),
            FilterChange::ShowLowStock(on) => next.show_low_stock = on,
            FilterChange::ShowOffers(on) => next.show_offers = on,
            FilterChange::ShowPopular(on) => next.show_popular = on,
        }
        next
    }

    pub fn with_page(&self, page: u32) -> FilterState {
        FilterState {
            page,
            ..self.clone()
        }
    }
}

fn dedup_tags(tags: Vec<TagRef>) -> Vec<TagRef> {
    let mut unique: Vec<TagRef> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !unique.iter().any(|t| t.id == tag.id) {
            unique.push(tag);
        }
    }
    unique
}

/// Rejected text in a price box.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid price: {0:?}")]
pub struct InvalidPrice(pub String);

/// Parses a price input box. An empty (or blank) box means "no bound", never zero.
pub fn parse_price_input(raw: &str) -> Result<Option<f64>, InvalidPrice> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err(InvalidPrice(raw.to_string())),
    }
}
