//! # EcoNest Storefront Core
//!
//! > **The search, filter and review pipeline of the EcoNest solar storefront, without the UI.**
//!
//! This crate holds the part of the storefront with real behavior: turning filter edits
//! into debounced, cancellable catalog searches, and paging product reviews in as the
//! shopper scrolls. Rendering is someone else's job. A UI reads published snapshots and
//! sends user intent back through typed handles.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Controllers as Actors
//! Every stateful piece (search session, comment section, tag picker) is a controller:
//! one Tokio task owning its state, fed commands over an mpsc channel, publishing whole
//! snapshots on a `watch` channel.
//! - **No locks**: state is touched only by its own task.
//! - **No torn reads**: subscribers always see a complete snapshot.
//! - **Testable**: the catalog is a trait object, so tests script it with [`clients::MockCatalog`].
//!
//! ### Explicit Cancellation
//! A search that is superseded by a newer filter has its [`CancellationToken`](tokio_util::sync::CancellationToken)
//! cancelled, which drops its HTTP requests. Results are also checked against the current
//! attempt before they are applied, so a response that slips through is discarded.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Type-Safe Error Handling
//! Each component has its own `thiserror` enum ([`clients::CatalogError`], [`search::SearchError`],
//! [`comments::CommentError`], [`tags::TagError`], [`config::ConfigError`]). Channel failures
//! ([`framework::FrameworkError`]) convert into them with `#[from]`.
//!
//! ### 2. Context Injection
//! Controllers are built with `new(&config)` and receive their dependencies in
//! `run(context)`. The [`lifecycle::Storefront`] creates the single catalog client and hands
//! it to everyone through a [`framework::ControllerContext`].
//!
//! ### 3. Observability
//! `tracing` everywhere with structured fields. See [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Plumbing ([`framework`])
//! The shared controller loop ([`Controller`](framework::Controller) +
//! [`ControllerRunner`](framework::ControllerRunner)), request/response messaging, the debounce
//! timer, attempt tracking and the controller context.
//!
//! ### 2. The Data ([`model`], [`query`])
//! Wire types of the catalog API, the shopper's [`FilterState`](query::FilterState) and the pure
//! [`build_query`](query::build_query) mapping.
//!
//! ### 3. The Interface ([`clients`])
//! The [`CatalogApi`](clients::CatalogApi) trait, its reqwest implementation and a scripted mock.
//!
//! ### 4. The Controllers ([`search`], [`comments`], [`tags`], [`detail`], [`home`])
//! - **Search**: debounced, cancellable product search with page navigation.
//! - **Comments**: visibility-driven pagination of product reviews.
//! - **Tags**: auto-complete and id resolution for the tag filter.
//! - **Detail**: product page with attribute selection.
//! - **Home**: the popular / offers feed.
//!
//! ### 5. The Orchestrator ([`lifecycle`])
//! [`Storefront`](lifecycle::Storefront) spawns controllers and shuts them down together.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Point at a running catalog API and search for "solar"
//! ECONEST_API_URL=http://localhost:5000 RUST_LOG=info cargo run -- solar
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod clients;
pub mod comments;
pub mod config;
pub mod detail;
pub mod framework;
pub mod home;
pub mod lifecycle;
pub mod model;
pub mod query;
pub mod search;
pub mod tags;
