//! # Product Detail View
//!
//! [`ProductView::open`] loads the extended product and starts a comment session
//! for it on a dedicated [`CommentLoader`]. The view owns that loader: closing the
//! view (or shutting down the storefront) stops it.

mod selection;

pub use selection::*;

use crate::clients::{CatalogApi, CatalogError};
use crate::comments::{CommentError, CommentHandle, CommentLoader};
use crate::config::StorefrontConfig;
use crate::framework::ControllerContext;
use crate::model::{ProductDetail, ProductId, ProductImage};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("Failed to load product: {0}")]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Comments(#[from] CommentError),
}

pub struct ProductView {
    product: ProductDetail,
    selection: AttributeSelection,
    comments: CommentHandle,
    api: Arc<dyn CatalogApi>,
    shutdown: CancellationToken,
    loader: JoinHandle<()>,
}

impl ProductView {
    /// Loads product `id` and opens its comments. A failed product load is returned
    /// before anything is spawned.
    #[instrument(skip(context, config))]
    pub async fn open(
        context: &ControllerContext,
        config: &StorefrontConfig,
        id: ProductId,
    ) -> Result<Self, ViewError> {
        let product = context.api.product_detail(id).await?;
        info!(product_id = %id, name = %product.name, "Product loaded");

        let context = context.child();
        let (loader, comments) = CommentLoader::new(config);
        let shutdown = context.shutdown.clone();
        let api = Arc::clone(&context.api);
        let loader = tokio::spawn(loader.run(context));
        comments.open(id).await?;

        Ok(Self {
            selection: AttributeSelection::for_product(&product),
            product,
            comments,
            api,
            shutdown,
            loader,
        })
    }

    pub fn product(&self) -> &ProductDetail {
        &self.product
    }

    pub fn comments(&self) -> &CommentHandle {
        &self.comments
    }

    pub fn selection(&self) -> &AttributeSelection {
        &self.selection
    }

    /// Toggles option `option_id` of attribute `attribute_id`.
    /// Returns `false` when the product has no such attribute option.
    pub fn toggle_option(&mut self, attribute_id: u64, option_id: u64) -> bool {
        let Some(attribute) = self.product.attributes.iter().find(|a| a.id == attribute_id) else {
            return false;
        };
        let Some(option) = attribute.options.iter().find(|o| o.id == option_id) else {
            return false;
        };
        self.selection.toggle(attribute, option);
        true
    }

    pub fn remove_attribute(&mut self, attribute_id: u64) {
        self.selection.remove(attribute_id);
    }

    pub fn image_url(&self, image: &ProductImage) -> String {
        self.api.image_url(&image.image_name)
    }

    pub fn main_image_url(&self) -> Option<String> {
        self.product.main_image().map(|i| self.image_url(i))
    }

    pub async fn main_image_bytes(&self) -> Result<Option<Vec<u8>>, CatalogError> {
        match self.product.main_image() {
            Some(image) => Ok(Some(self.api.product_image(&image.image_name).await?)),
            None => Ok(None),
        }
    }

    /// Stops the comment loader and waits for it to exit.
    pub async fn close(self) {
        self.shutdown.cancel();
        let _ = self.loader.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fixtures::{comment_page, product_detail};
    use crate::clients::MockCatalog;
    use crate::comments::CommentPhase;
    use crate::model::{AttributeOption, AttributeWithOptions};

    fn context(mock: &MockCatalog) -> ControllerContext {
        ControllerContext::new(Arc::new(mock.clone()))
    }

    #[tokio::test]
    async fn test_open_loads_product_and_comments() {
        let mock = MockCatalog::new();
        let mut product = product_detail(42, "Mono Panel");
        product.images = vec![
            ProductImage {
                id: 1,
                image_name: "side.png".into(),
                is_main: false,
                product_id: ProductId(42),
            },
            ProductImage {
                id: 2,
                image_name: "front.png".into(),
                is_main: true,
                product_id: ProductId(42),
            },
        ];
        mock.expect_product_detail().return_ok(product);
        mock.expect_comment_pages().return_ok(1);
        mock.expect_comments().return_ok(comment_page(42, 1, 2));
        mock.expect_image().return_ok(vec![0x89, 0x50]);

        let view = ProductView::open(&context(&mock), &StorefrontConfig::default(), ProductId(42))
            .await
            .unwrap();
        assert_eq!(view.product().name, "Mono Panel");
        assert_eq!(
            view.main_image_url().as_deref(),
            Some("mock://product/image/front.png")
        );
        assert_eq!(view.main_image_bytes().await.unwrap(), Some(vec![0x89, 0x50]));

        let comments = view.comments().wait_until_idle().await.unwrap();
        assert_eq!(comments.phase, CommentPhase::Exhausted);
        assert_eq!(comments.items.len(), 2);

        view.close().await;
        mock.verify();
    }

    #[tokio::test]
    async fn test_failed_load_is_returned() {
        let mock = MockCatalog::new();
        mock.expect_product_detail()
            .return_err(CatalogError::NotFound("/product/404/extended".into()));

        let result =
            ProductView::open(&context(&mock), &StorefrontConfig::default(), ProductId(404)).await;
        assert!(matches!(result, Err(ViewError::Catalog(CatalogError::NotFound(_)))));
        assert_eq!(mock.calls().len(), 1);
        mock.verify();
    }

    #[tokio::test]
    async fn test_toggle_option_by_id() {
        let mock = MockCatalog::new();
        let mut product = product_detail(8, "Battery");
        product.attributes = vec![AttributeWithOptions {
            id: 3,
            label: "Capacity".into(),
            options: vec![AttributeOption {
                id: 30,
                value: "5kWh".into(),
                attribute_id: Some(3),
            }],
        }];
        mock.expect_product_detail().return_ok(product);
        mock.expect_comment_pages().return_ok(0);

        let mut view = ProductView::open(&context(&mock), &StorefrontConfig::default(), ProductId(8))
            .await
            .unwrap();
        assert!(view.toggle_option(3, 30));
        assert!(view.selection().is_selected(3, 30));
        assert!(!view.toggle_option(3, 99));
        view.remove_attribute(3);
        assert!(view.selection().selected().is_empty());

        view.comments().wait_until_idle().await.unwrap();
        view.close().await;
        mock.verify();
    }
}
