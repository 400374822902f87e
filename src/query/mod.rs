//! Filter state and the pure mapping from it to catalog query parameters.

pub mod builder;
pub mod filter;

pub use builder::*;
pub use filter::*;
