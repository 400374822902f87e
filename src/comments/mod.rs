//! Incremental, visibility-driven comment pagination for a product page.

mod handle;
mod loader;

pub use handle::*;
pub use loader::*;

use crate::framework::FrameworkError;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CommentError {
    #[error("Comment loader unavailable: {0}")]
    Controller(#[from] FrameworkError),
}
