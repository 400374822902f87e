//! Tag auto-complete for the filter sidebar.

mod picker;

pub use picker::*;

use crate::framework::FrameworkError;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TagError {
    #[error("Tag picker unavailable: {0}")]
    Controller(#[from] FrameworkError),
}
