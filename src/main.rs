//! # econest
//!
//! Demo driver for the storefront core against a live catalog API:
//! 1. Prints the home feed.
//! 2. Searches for the keyword given on the command line (default `solar`).
//! 3. Opens the first result and pages through its reviews.

use econest_storefront::config::StorefrontConfig;
use econest_storefront::lifecycle::{setup_tracing, Storefront};
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let keyword = std::env::args().nth(1).unwrap_or_else(|| "solar".to_string());
    let config = StorefrontConfig::load().map_err(|e| e.to_string())?;
    info!(api = %config.api_base_url, %keyword, "Starting storefront demo");

    let mut storefront = Storefront::new(config).map_err(|e| e.to_string())?;

    match storefront.home_feed().await {
        Ok(feed) => {
            for product in &feed.popular {
                info!(product_id = %product.id, name = %product.name, score = product.average_score, "Popular");
            }
            for product in &feed.offers {
                info!(product_id = %product.id, name = %product.name, discount = product.discount(), "On offer");
            }
        }
        Err(e) => error!(error = %e, "Home feed unavailable"),
    }

    let search = storefront.open_search();
    let span = tracing::info_span!("search", %keyword);
    let results = async {
        search.set_keyword(&keyword).await.map_err(|e| e.to_string())?;
        search.wait_until_settled().await.map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;

    if let Some(e) = &results.error {
        error!(error = %e, "Search failed");
    }
    info!(count = results.products.len(), pages = results.total_pages, "Search settled");

    if let Some(first) = results.products.first() {
        let span = tracing::info_span!("product", product_id = %first.id);
        async {
            let view = storefront
                .open_product(first.id)
                .await
                .map_err(|e| e.to_string())?;
            info!(
                name = %view.product().name,
                price = view.product().effective_price(),
                "Product opened"
            );

            let comments = view.comments();
            let mut snapshot = comments.wait_until_idle().await.map_err(|e| e.to_string())?;
            while snapshot.has_more()
                && comments.sentinel_visible().await.map_err(|e| e.to_string())?
            {
                let next = comments.wait_until_idle().await.map_err(|e| e.to_string())?;
                let stalled = next.current_page == snapshot.current_page;
                snapshot = next;
                if stalled {
                    break;
                }
            }
            info!(
                comments = snapshot.items.len(),
                pages = snapshot.total_pages,
                "Reviews loaded"
            );

            view.close().await;
            Ok::<(), String>(())
        }
        .instrument(span)
        .await?;
    }

    storefront.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}
