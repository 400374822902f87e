//! Building blocks shared by every controller in the storefront.
//!
//! A controller follows the same shape everywhere:
//!
//! - `new(&config)` constructors return the *server* half (the controller, which owns
//!   state) and a cheap, cloneable *handle*.
//! - The event loop itself is written once in [`ControllerRunner`]; each controller
//!   implements [`Controller`] to say how it reacts.
//! - The controller is spawned with `tokio::spawn(controller.run(context))`. Dependencies
//!   (the catalog API, the shutdown token) are injected at `run()` time, not at construction.
//! - Handles talk to the controller through an mpsc channel and wait for an acknowledgement
//!   on a oneshot channel ([`request`]).
//! - Controllers publish whole-state snapshots on a `tokio::sync::watch` channel; readers never
//!   observe a half-applied mutation.
//!
//! # Main Components
//!
//! - [`Controller`] / [`ControllerRunner`] - the shared event loop
//! - [`Debouncer`] - quiet-period timer that can be re-armed or cancelled
//! - [`AttemptTracker`] / [`Attempt`] - cancellation tokens tagging in-flight work
//! - [`FrameworkError`] - controller channel failures
//! - [`ControllerContext`] - dependencies injected into `run()`

pub mod attempt;
pub mod context;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod message;

pub use attempt::{Attempt, AttemptTracker};
pub use context::ControllerContext;
pub use controller::{Controller, ControllerRunner, ControllerRuntime};
pub use debounce::Debouncer;
pub use error::FrameworkError;
pub use message::{request, Response};
