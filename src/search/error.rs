//! Error types for the search controller.

use crate::framework::FrameworkError;
use crate::query::InvalidPrice;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SearchError {
    /// Page moves are limited to `1..=pages` of the last settled search.
    #[error("Page {requested} out of range 1..={pages}")]
    PageOutOfRange { requested: u32, pages: u32 },

    #[error(transparent)]
    InvalidPrice(#[from] InvalidPrice),

    #[error("Search controller unavailable: {0}")]
    Controller(#[from] FrameworkError),
}
