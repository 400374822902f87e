use crate::framework::{request, FrameworkError};
use crate::model::TagRef;
use crate::query::{parse_price_input, FilterChange};
use crate::search::controller::SearchCommand;
use crate::search::{SearchError, SearchSnapshot};
use tokio::sync::{mpsc, watch};
use tracing::instrument;

/// Client half of a search session. Cheap to clone.
///
/// Setters return once the controller has taken the change (and restarted its quiet
/// period), not when the search completes. Use [`SearchHandle::wait_until_settled`]
/// or [`SearchHandle::subscribe`] to observe results.
#[derive(Clone)]
pub struct SearchHandle {
    sender: mpsc::Sender<SearchCommand>,
    snapshot: watch::Receiver<SearchSnapshot>,
}

impl SearchHandle {
    pub(crate) fn new(
        sender: mpsc::Sender<SearchCommand>,
        snapshot: watch::Receiver<SearchSnapshot>,
    ) -> Self {
        Self { sender, snapshot }
    }

    #[instrument(skip(self))]
    pub async fn apply(&self, change: FilterChange) -> Result<(), SearchError> {
        request(&self.sender, |respond_to| SearchCommand::Change { change, respond_to }).await?;
        Ok(())
    }

    pub async fn set_keyword(&self, keyword: &str) -> Result<(), SearchError> {
        self.apply(FilterChange::Keyword(keyword.to_string())).await
    }

    pub async fn set_min_price(&self, price: Option<f64>) -> Result<(), SearchError> {
        self.apply(FilterChange::MinPrice(price)).await
    }

    pub async fn set_max_price(&self, price: Option<f64>) -> Result<(), SearchError> {
        self.apply(FilterChange::MaxPrice(price)).await
    }

    /// Sets the lower price bound from raw input; an empty box clears it.
    pub async fn set_min_price_input(&self, raw: &str) -> Result<(), SearchError> {
        self.set_min_price(parse_price_input(raw)?).await
    }

    /// Sets the upper price bound from raw input; an empty box clears it.
    pub async fn set_max_price_input(&self, raw: &str) -> Result<(), SearchError> {
        self.set_max_price(parse_price_input(raw)?).await
    }

    pub async fn set_tags(&self, tags: Vec<TagRef>) -> Result<(), SearchError> {
        self.apply(FilterChange::Tags(tags)).await
    }

    pub async fn set_show_low_stock(&self, on: bool) -> Result<(), SearchError> {
        self.apply(FilterChange::ShowLowStock(on)).await
    }

    pub async fn set_show_offers(&self, on: bool) -> Result<(), SearchError> {
        self.apply(FilterChange::ShowOffers(on)).await
    }

    pub async fn set_show_popular(&self, on: bool) -> Result<(), SearchError> {
        self.apply(FilterChange::ShowPopular(on)).await
    }

    /// Moves to `page`, which must lie in `1..=total_pages`.
    #[instrument(skip(self))]
    pub async fn set_page(&self, page: u32) -> Result<(), SearchError> {
        request(&self.sender, |respond_to| SearchCommand::SetPage { page, respond_to }).await?
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.snapshot.clone()
    }

    /// Waits for the next settled (succeeded or failed) snapshot.
    pub async fn wait_until_settled(&self) -> Result<SearchSnapshot, SearchError> {
        let mut updates = self.snapshot.clone();
        let settled = updates
            .wait_for(|s| s.phase.is_settled())
            .await
            .map_err(|_| FrameworkError::ControllerDropped)?;
        Ok(settled.clone())
    }
}
