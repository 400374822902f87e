//! Storefront orchestration and observability setup.
//!
//! - [`Storefront`] - wires the catalog client into every controller it spawns and
//!   shuts them all down together
//! - [`setup_tracing`] - initializes the `tracing` subscriber

pub mod storefront;
pub mod tracing;

pub use self::tracing::*;
pub use storefront::*;
