use crate::clients::{CatalogApi, CatalogClient, CatalogError};
use crate::config::StorefrontConfig;
use crate::detail::{ProductView, ViewError};
use crate::framework::ControllerContext;
use crate::home::{load_home_feed, HomeFeed};
use crate::model::ProductId;
use crate::search::{SearchController, SearchHandle};
use crate::tags::{TagHandle, TagPicker};
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info};

/// The runtime orchestrator of the storefront core.
///
/// `Storefront` is responsible for:
/// - **Dependency Wiring**: one catalog client, shared by every controller through
///   a [`ControllerContext`]
/// - **Lifecycle Management**: spawning controllers and stopping them together
///
/// # Example
///
/// ```ignore
/// let mut storefront = Storefront::new(StorefrontConfig::load()?)?;
///
/// let search = storefront.open_search();
/// search.set_keyword("solar").await?;
/// let results = search.wait_until_settled().await?;
///
/// let view = storefront.open_product(results.products[0].id).await?;
/// view.comments().sentinel_visible().await?;
///
/// view.close().await;
/// storefront.shutdown().await?;
/// ```
pub struct Storefront {
    config: StorefrontConfig,
    context: ControllerContext,
    /// Spawned controllers (used for graceful shutdown). Finished ones are reaped
    /// whenever another controller is opened.
    tasks: JoinSet<()>,
}

impl Storefront {
    /// Builds the HTTP catalog client from `config`.
    pub fn new(config: StorefrontConfig) -> Result<Self, CatalogError> {
        let client = CatalogClient::from_config(&config)?;
        info!(api = %client.base_url(), "Storefront ready");
        Ok(Self::with_api(config, Arc::new(client)))
    }

    /// Uses `api` as the catalog backend, e.g. a [`MockCatalog`](crate::clients::MockCatalog).
    pub fn with_api(config: StorefrontConfig, api: Arc<dyn CatalogApi>) -> Self {
        Self {
            config,
            context: ControllerContext::new(api),
            tasks: JoinSet::new(),
        }
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn api(&self) -> Arc<dyn CatalogApi> {
        Arc::clone(&self.context.api)
    }

    /// Starts a product list session. Its first search is already scheduled.
    ///
    /// The session ends when its last handle is dropped.
    pub fn open_search(&mut self) -> SearchHandle {
        self.reap_finished();
        let (controller, handle) = SearchController::new(&self.config);
        self.tasks.spawn(controller.run(self.context.child()));
        handle
    }

    pub fn open_tag_picker(&mut self) -> TagHandle {
        self.reap_finished();
        let (picker, handle) = TagPicker::new(&self.config);
        self.tasks.spawn(picker.run(self.context.child()));
        handle
    }

    /// Controllers spawned by this storefront that have not been reaped yet.
    pub fn running_controllers(&self) -> usize {
        self.tasks.len()
    }

    fn reap_finished(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(e) = result {
                log_task_failure(&e);
            }
        }
    }

    /// Loads a product page. The view's comment loader also stops on shutdown.
    pub async fn open_product(&self, id: ProductId) -> Result<ProductView, ViewError> {
        ProductView::open(&self.context, &self.config, id).await
    }

    pub async fn home_feed(&self) -> Result<HomeFeed, CatalogError> {
        load_home_feed(self.context.api.as_ref()).await
    }

    /// Cancels every controller and waits for their tasks.
    ///
    /// Returns an error if any controller task panicked.
    pub async fn shutdown(mut self) -> Result<(), String> {
        info!(controllers = self.tasks.len(), "Shutting down storefront...");
        self.context.shutdown.cancel();

        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                log_task_failure(&e);
                return Err(format!("Controller task failed: {:?}", e));
            }
        }

        info!("Storefront shutdown complete.");
        Ok(())
    }
}

fn log_task_failure(e: &JoinError) {
    error!("Controller task failed: {:?}", e);
}
