use crate::clients::CatalogError;
use crate::model::{CommentWithUser, ProductDetail, ProductId, ProductSummary, TagId, TagRef};
use crate::query::{QueryDescriptor, TagSearchQuery};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Read-only access to the remote catalog.
///
/// Controllers only ever see `Arc<dyn CatalogApi>`, so tests swap in
/// [`MockCatalog`](crate::clients::MockCatalog) without touching controller code.
///
/// Operations that take a [`CancellationToken`] resolve to
/// [`CatalogError::Cancelled`] once the token fires, dropping the in-flight request.
#[async_trait]
pub trait CatalogApi: Send + Sync + 'static {
    /// One page of products matching `query` (`/product`).
    async fn list_products(
        &self,
        query: &QueryDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProductSummary>, CatalogError>;

    /// Number of result pages for `query` (`/product/pages`).
    async fn product_pages(
        &self,
        query: &QueryDescriptor,
        cancel: &CancellationToken,
    ) -> Result<u32, CatalogError>;

    async fn product_detail(&self, id: ProductId) -> Result<ProductDetail, CatalogError>;

    async fn search_tags(
        &self,
        query: &TagSearchQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<TagRef>, CatalogError>;

    async fn tag(&self, id: TagId) -> Result<TagRef, CatalogError>;

    /// Comments on `product_id`, 1-based `page`.
    async fn product_comments(
        &self,
        product_id: ProductId,
        page: u32,
    ) -> Result<Vec<CommentWithUser>, CatalogError>;

    async fn comment_pages(&self, product_id: ProductId) -> Result<u32, CatalogError>;

    /// Raw bytes of an image asset.
    async fn product_image(&self, image_name: &str) -> Result<Vec<u8>, CatalogError>;

    /// Where the image asset `image_name` is served from.
    fn image_url(&self, image_name: &str) -> String;
}
