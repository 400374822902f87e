//! The catalog seam: the [`CatalogApi`] trait, its reqwest implementation
//! ([`CatalogClient`]) and a scripted test double ([`MockCatalog`]).

pub mod api;
pub mod error;
pub mod fixtures;
pub mod http;
pub mod mock;

pub use api::*;
pub use error::*;
pub use http::*;
pub use mock::*;
