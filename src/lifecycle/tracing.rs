//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing_subscriber` formatter filtered by
//! `RUST_LOG`.
//!
//! ## What Gets Traced
//!
//! - **Controller lifecycle** (`info`): search, comment and tag controllers starting
//!   and stopping, products and comment sessions opening
//! - **Scheduling decisions** (`debug`): filter changes, cancelled attempts,
//!   discarded late results, ignored sentinel signals
//! - **Degraded paths** (`warn`): failed searches, comment pages and tag lookups
//! - **Catalog requests**: every [`CatalogClient`](crate::clients::CatalogClient)
//!   method runs in its own span carrying its arguments
//!
//! ## Usage
//!
//! ```bash
//! # Lifecycle only
//! RUST_LOG=info cargo run -- solar
//!
//! # Watch the debounce coalesce keystrokes
//! RUST_LOG=econest_storefront=debug cargo run -- solar
//! ```
//!
//! With `debug`, a superseded search shows up as:
//!
//! ```text
//! DEBUG Filter change change=Keyword("sol")
//! DEBUG Filter change change=Keyword("solar")
//! DEBUG Fetching products attempt=2 query=QueryDescriptor { keyword: Some("solar"), .. }
//! INFO  Search settled attempt=2 count=12 pages=3
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Structured fields (attempt, product_id, page) carry the context
        .compact()
        .init();
}
