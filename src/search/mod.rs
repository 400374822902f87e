//! Debounced, cancellable product search.
//!
//! [`SearchController`] owns the [`FilterState`](crate::query::FilterState) of one
//! list page session. Filter edits arrive through a [`SearchHandle`]; after a quiet
//! period the controller fetches the product page and the page count together and
//! publishes a [`SearchSnapshot`].

mod controller;
pub mod error;
mod handle;

pub use controller::*;
pub use error::*;
pub use handle::*;
