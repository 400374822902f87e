use crate::clients::CatalogError;
use crate::config::StorefrontConfig;
use crate::framework::{
    Attempt, Controller, ControllerContext, ControllerRunner, ControllerRuntime, Response,
};
use crate::model::ProductSummary;
use crate::query::{build_query, FilterChange, FilterState, QueryDescriptor};
use crate::search::{SearchError, SearchHandle};
use tracing::{debug, info, warn};

/// Where the search is in its debounce / fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Nothing requested yet.
    Idle,
    /// Waiting out the quiet period.
    Scheduled,
    Fetching,
    Succeeded,
    /// The last attempt failed; the error is in the snapshot. Any change retries.
    Failed,
}

impl SearchPhase {
    pub fn is_settled(self) -> bool {
        matches!(self, SearchPhase::Succeeded | SearchPhase::Failed)
    }
}

/// Everything a list page renders, published whole after every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    pub phase: SearchPhase,
    pub filter: FilterState,
    /// Products of the most recent successful search.
    pub products: Vec<ProductSummary>,
    pub total_pages: u32,
    pub error: Option<CatalogError>,
    /// The query `products` answers.
    pub settled_query: Option<QueryDescriptor>,
}

impl Default for SearchSnapshot {
    fn default() -> Self {
        Self {
            phase: SearchPhase::Idle,
            filter: FilterState::default(),
            products: Vec::new(),
            total_pages: 1,
            error: None,
            settled_query: None,
        }
    }
}

#[derive(Debug)]
pub(crate) enum SearchCommand {
    Change {
        change: FilterChange,
        respond_to: Response<()>,
    },
    SetPage {
        page: u32,
        respond_to: Response<Result<(), SearchError>>,
    },
}

pub(crate) struct FetchOutcome {
    attempt: Attempt,
    query: QueryDescriptor,
    result: Result<(Vec<ProductSummary>, u32), CatalogError>,
}

/// The state and reactions of one search session.
pub(crate) struct SearchSession {
    state: SearchSnapshot,
}

/// The actor half of a search session.
///
/// # State machine
///
/// ```text
/// Idle ──change──▶ Scheduled ──quiet period──▶ Fetching ──▶ Succeeded | Failed
///                     ▲   │                       │
///                     └───┴──────── change ───────┘   (cancels timer / request)
/// ```
///
/// Every fetch runs as its own task under a fresh [`Attempt`]. A change cancels the
/// in-flight attempt's token, which drops its HTTP requests. If a result still
/// arrives, it no longer matches the current attempt and is discarded.
pub struct SearchController {
    runner: ControllerRunner<SearchSession>,
}

impl SearchController {
    pub fn new(config: &StorefrontConfig) -> (Self, SearchHandle) {
        let session = SearchSession {
            state: SearchSnapshot::default(),
        };
        let (runner, sender, snapshot) = ControllerRunner::new(session, config.channel_capacity);
        let controller = Self {
            runner: runner.with_debounce(config.search_debounce()),
        };
        (controller, SearchHandle::new(sender, snapshot))
    }

    /// Runs the session until every handle is dropped or the context shuts down.
    ///
    /// The first search is scheduled immediately, as a list page loads on mount.
    pub async fn run(self, context: ControllerContext) {
        self.runner.run(context).await
    }
}

type Runtime = ControllerRuntime<SearchSession>;

impl Controller for SearchSession {
    type Command = SearchCommand;
    type Outcome = FetchOutcome;
    type Snapshot = SearchSnapshot;

    const NAME: &'static str = "search";

    fn snapshot(&self) -> SearchSnapshot {
        self.state.clone()
    }

    fn on_start(&mut self, runtime: &mut Runtime) {
        self.reschedule(runtime);
    }

    fn on_command(&mut self, command: SearchCommand, runtime: &mut Runtime) {
        match command {
            SearchCommand::Change { change, respond_to } => {
                debug!(?change, "Filter change");
                self.state.filter = self.state.filter.apply(change);
                self.reschedule(runtime);
                let _ = respond_to.send(());
            }
            SearchCommand::SetPage { page, respond_to } => {
                let pages = self.state.total_pages;
                if !(1..=pages).contains(&page) {
                    debug!(page, pages, "Page out of range");
                    let _ = respond_to.send(Err(SearchError::PageOutOfRange {
                        requested: page,
                        pages,
                    }));
                    return;
                }
                debug!(page, "Page change");
                self.state.filter = self.state.filter.with_page(page);
                self.reschedule(runtime);
                let _ = respond_to.send(Ok(()));
            }
        }
    }

    fn on_quiet_period(&mut self, runtime: &mut Runtime) {
        let query = build_query(&self.state.filter);
        let attempt = runtime.attempts.begin();
        debug!(attempt = attempt.id(), ?query, "Fetching products");

        self.state.phase = SearchPhase::Fetching;
        runtime.publish(self.snapshot());

        let api = runtime.api();
        runtime.spawn(async move {
            let token = attempt.token().clone();
            let result = tokio::try_join!(
                api.list_products(&query, &token),
                api.product_pages(&query, &token),
            );
            FetchOutcome {
                attempt,
                query,
                result,
            }
        });
    }

    fn on_outcome(&mut self, outcome: FetchOutcome, runtime: &mut Runtime) {
        let FetchOutcome {
            attempt,
            query,
            result,
        } = outcome;

        if !runtime.attempts.is_current(&attempt) {
            debug!(attempt = attempt.id(), "Discarding superseded result");
            return;
        }
        runtime.attempts.finish(&attempt);

        match result {
            Ok((products, pages)) => {
                info!(attempt = attempt.id(), count = products.len(), pages, "Search settled");
                self.state.products = products;
                self.state.total_pages = pages;
                self.state.error = None;
                self.state.settled_query = Some(query);
                self.state.phase = SearchPhase::Succeeded;
            }
            Err(e) => {
                warn!(attempt = attempt.id(), error = %e, "Search failed");
                self.state.error = Some(e);
                self.state.phase = SearchPhase::Failed;
            }
        }
        runtime.publish(self.snapshot());
    }
}

impl SearchSession {
    /// Drops any pending timer or in-flight attempt and restarts the quiet period.
    fn reschedule(&mut self, runtime: &mut Runtime) {
        if runtime.attempts.supersede() {
            debug!("Cancelled in-flight search");
        }
        runtime.debouncer.schedule();
        self.state.phase = SearchPhase::Scheduled;
        runtime.publish(self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fixtures::product_summary;
    use crate::clients::{CatalogApi, MockCall, MockCatalog};
    use crate::framework::FrameworkError;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::task::JoinHandle;
    use tokio_util::sync::CancellationToken;

    fn spawn(mock: &MockCatalog) -> (SearchHandle, ControllerContext, JoinHandle<()>) {
        let api: Arc<dyn CatalogApi> = Arc::new(mock.clone());
        let context = ControllerContext::new(api);
        let (controller, handle) = SearchController::new(&StorefrontConfig::default());
        let task = tokio::spawn(controller.run(context.clone()));
        (handle, context, task)
    }

    fn keywords(mock: &MockCatalog) -> Vec<Option<String>> {
        mock.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::ListProducts(query) => Some(query.keyword),
                _ => None,
            })
            .collect()
    }

    /// Tokens handed to both requests of the search for `keyword`.
    fn tokens_for(mock: &MockCatalog, keyword: &str) -> Vec<CancellationToken> {
        mock.tokens_where(|call| {
            matches!(call, MockCall::ListProducts(q) | MockCall::ProductPages(q)
                if q.keyword.as_deref() == Some(keyword))
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load_on_start() {
        let mock = MockCatalog::new();
        mock.expect_products()
            .return_ok(vec![product_summary(1, "Panel"), product_summary(2, "Inverter")]);
        mock.expect_product_pages().return_ok(4);

        let (handle, _context, _task) = spawn(&mock);
        let snapshot = handle.wait_until_settled().await.unwrap();

        assert_eq!(snapshot.phase, SearchPhase::Succeeded);
        assert_eq!(snapshot.products.len(), 2);
        assert_eq!(snapshot.total_pages, 4);
        assert_eq!(snapshot.settled_query.unwrap().page, Some(1));
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_changes_coalesce_into_one_fetch() {
        let mock = MockCatalog::new();
        mock.expect_products().return_ok(vec![product_summary(7, "Solar Panel")]);
        mock.expect_product_pages().return_ok(1);

        let (handle, _context, _task) = spawn(&mock);
        handle.set_keyword("sol").await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.set_keyword("solar").await.unwrap();

        let snapshot = handle.wait_until_settled().await.unwrap();
        assert_eq!(snapshot.products[0].id.0, 7);
        assert_eq!(keywords(&mock), vec![Some("solar".to_string())]);
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_result_is_discarded() {
        let mock = MockCatalog::new();
        // Initial load
        mock.expect_products().return_ok(vec![]);
        mock.expect_product_pages().return_ok(1);
        // "slow": answers after the newer search settled
        mock.expect_products()
            .delay(Duration::from_secs(2))
            .return_ok(vec![product_summary(1, "Stale")]);
        mock.expect_product_pages()
            .delay(Duration::from_secs(2))
            .return_ok(9);
        // "fast"
        mock.expect_products().return_ok(vec![product_summary(2, "Fresh")]);
        mock.expect_product_pages().return_ok(1);

        let (handle, _context, _task) = spawn(&mock);
        handle.wait_until_settled().await.unwrap();

        handle.set_keyword("slow").await.unwrap();
        let mut updates = handle.subscribe();
        updates
            .wait_for(|s| s.phase == SearchPhase::Fetching)
            .await
            .unwrap();
        handle.set_keyword("fast").await.unwrap();

        let snapshot = handle.wait_until_settled().await.unwrap();
        assert_eq!(snapshot.products[0].name, "Fresh");

        tokio::time::sleep(Duration::from_secs(5)).await;
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.products[0].name, "Fresh");
        assert_eq!(snapshot.total_pages, 1);
        assert_eq!(snapshot.filter.keyword, "fast");
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_change_cancels_in_flight_requests() {
        let mock = MockCatalog::new();
        mock.expect_products().return_ok(vec![]);
        mock.expect_product_pages().return_ok(1);
        mock.expect_products()
            .delay(Duration::from_secs(2))
            .return_ok(vec![product_summary(1, "Stale")]);
        mock.expect_product_pages()
            .delay(Duration::from_secs(2))
            .return_ok(1);
        mock.expect_products().return_ok(vec![product_summary(2, "Fresh")]);
        mock.expect_product_pages().return_ok(1);

        let (handle, _context, _task) = spawn(&mock);
        handle.wait_until_settled().await.unwrap();

        handle.set_keyword("slow").await.unwrap();
        let mut updates = handle.subscribe();
        updates
            .wait_for(|s| s.phase == SearchPhase::Fetching)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let slow = tokens_for(&mock, "slow");
        assert_eq!(slow.len(), 2);
        assert!(slow.iter().all(|t| !t.is_cancelled()));

        handle.set_keyword("fast").await.unwrap();
        assert!(slow.iter().all(|t| t.is_cancelled()));

        let snapshot = handle.wait_until_settled().await.unwrap();
        assert_eq!(snapshot.products[0].name, "Fresh");
        let fast = tokens_for(&mock, "fast");
        assert_eq!(fast.len(), 2);
        assert!(fast.iter().all(|t| !t.is_cancelled()));
        // Settled attempts are finished, not cancelled.
        assert!(mock.tokens()[..2].iter().all(|(_, t)| !t.is_cancelled()));
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_surfaces_error_and_change_retries() {
        let mock = MockCatalog::new();
        mock.expect_products().return_ok(vec![product_summary(1, "Panel")]);
        mock.expect_product_pages()
            .return_err(CatalogError::Network("503 Service Unavailable".into()));
        mock.expect_products().return_ok(vec![product_summary(1, "Panel")]);
        mock.expect_product_pages().return_ok(1);

        let (handle, _context, _task) = spawn(&mock);
        let failed = handle.wait_until_settled().await.unwrap();
        assert_eq!(failed.phase, SearchPhase::Failed);
        assert!(matches!(failed.error, Some(CatalogError::Network(_))));
        assert!(failed.products.is_empty());

        handle.set_show_offers(true).await.unwrap();
        let recovered = handle.wait_until_settled().await.unwrap();
        assert_eq!(recovered.phase, SearchPhase::Succeeded);
        assert_eq!(recovered.error, None);
        assert_eq!(recovered.settled_query.unwrap().has_offer, Some(true));
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_changes_are_range_checked() {
        let mock = MockCatalog::new();
        mock.expect_products().return_ok(vec![]);
        mock.expect_product_pages().return_ok(2);
        mock.expect_products().return_ok(vec![]);
        mock.expect_product_pages().return_ok(2);

        let (handle, _context, _task) = spawn(&mock);
        handle.wait_until_settled().await.unwrap();

        assert_eq!(
            handle.set_page(3).await,
            Err(SearchError::PageOutOfRange {
                requested: 3,
                pages: 2
            })
        );
        assert!(handle.set_page(0).await.is_err());

        handle.set_page(2).await.unwrap();
        let snapshot = handle.wait_until_settled().await.unwrap();
        assert_eq!(snapshot.filter.page, 2);
        assert_eq!(snapshot.settled_query.unwrap().page, Some(2));
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_price_is_rejected_locally() {
        let mock = MockCatalog::new();
        mock.expect_products().return_ok(vec![]);
        mock.expect_product_pages().return_ok(1);

        let (handle, _context, _task) = spawn(&mock);
        assert!(matches!(
            handle.set_min_price_input("cheap").await,
            Err(SearchError::InvalidPrice(_))
        ));
        handle.wait_until_settled().await.unwrap();
        assert_eq!(handle.snapshot().filter.min_price, None);
        mock.verify();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_closes_handle() {
        let mock = MockCatalog::new();
        let (handle, context, task) = spawn(&mock);

        context.shutdown.cancel();
        task.await.unwrap();

        assert_eq!(
            handle.set_keyword("panel").await,
            Err(SearchError::Controller(FrameworkError::ControllerClosed))
        );
        assert!(mock.calls().is_empty());
    }
}
