//! Read-only projections of catalog data, as they arrive from the API.
//!
//! Every timestamp is deserialized straight into `chrono::DateTime<Utc>`, so wire
//! strings are parsed exactly once, at the client boundary.

pub mod comment;
pub mod product;
pub mod tag;

pub use comment::*;
pub use product::*;
pub use tag::*;

use serde::Deserialize;

/// Body of every `.../pages` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageCount {
    pub pages: u32,
}
