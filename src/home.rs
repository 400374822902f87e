//! The home page feed: a popular-products carousel and a strip of current offers.

use crate::clients::{CatalogApi, CatalogError};
use crate::model::ProductSummary;
use crate::query::{home_offers_query, home_popular_query};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct HomeFeed {
    pub popular: Vec<ProductSummary>,
    pub offers: Vec<ProductSummary>,
}

/// Loads popular products, then offers. The first failure is returned.
#[instrument(skip(api))]
pub async fn load_home_feed(api: &dyn CatalogApi) -> Result<HomeFeed, CatalogError> {
    let never = CancellationToken::new();
    let popular = api.list_products(&home_popular_query(), &never).await?;
    let offers = api.list_products(&home_offers_query(), &never).await?;
    debug!(popular = popular.len(), offers = offers.len(), "Home feed loaded");
    Ok(HomeFeed { popular, offers })
}
