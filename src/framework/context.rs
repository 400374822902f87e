//! # Context Injection
//!
//! Controllers are built without dependencies and receive them in `run(context)`.
//! The storefront creates one context and clones it into every controller it spawns.

use crate::clients::CatalogApi;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runtime dependencies handed to a controller's `run()`.
#[derive(Clone)]
pub struct ControllerContext {
    /// The catalog backend shared by every controller.
    pub api: Arc<dyn CatalogApi>,
    /// Fires when the storefront shuts down; controllers leave their loop.
    pub shutdown: CancellationToken,
}

impl ControllerContext {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            shutdown: CancellationToken::new(),
        }
    }

    /// A context whose shutdown token is a child of this one.
    pub fn child(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            shutdown: self.shutdown.child_token(),
        }
    }
}
