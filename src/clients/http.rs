//! # Catalog HTTP Client
//!
//! [`CatalogClient`] speaks to the storefront REST API over `reqwest`. Every body is
//! read as bytes and decoded with `serde_json`, so a malformed payload or date
//! surfaces as [`CatalogError::Parse`] instead of a transport error.

use crate::clients::{CatalogApi, CatalogError};
use crate::config::StorefrontConfig;
use crate::model::{
    CommentWithUser, PageCount, ProductDetail, ProductId, ProductSummary, TagId, TagRef,
};
use crate::query::{CommentPageQuery, QueryDescriptor, TagSearchQuery};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Fixed path prefixes of the catalog API.
mod routes {
    pub const PRODUCTS: &str = "/product";
    pub const PRODUCT_PAGES: &str = "/product/pages";
    pub const TAGS: &str = "/product/tag";
    pub const IMAGES: &str = "/product/image";
}

/// reqwest-backed [`CatalogApi`].
#[derive(Clone, Debug)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &StorefrontConfig) -> Result<Self, CatalogError> {
        Self::new(config.api_base_url.as_str())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    /// Sends `request` and returns the raw body of a successful response.
    async fn fetch(path: &str, request: RequestBuilder) -> Result<Vec<u8>, CatalogError> {
        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(CatalogError::NotFound(path.to_string())),
            status if !status.is_success() => {
                Err(CatalogError::Network(format!("{status} from {path}")))
            }
            _ => response
                .bytes()
                .await
                .map(|body| body.to_vec())
                .map_err(|e| CatalogError::Network(e.to_string())),
        }
    }

    async fn fetch_json<T: DeserializeOwned>(
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, CatalogError> {
        let body = Self::fetch(path, request).await?;
        serde_json::from_slice(&body).map_err(|e| CatalogError::Parse(format!("{path}: {e}")))
    }
}

/// Races `request` against `cancel`. Losing the race drops the request future,
/// which aborts the HTTP exchange.
async fn cancellable<T>(
    cancel: &CancellationToken,
    request: impl Future<Output = Result<T, CatalogError>>,
) -> Result<T, CatalogError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CatalogError::Cancelled),
        result = request => result,
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    #[instrument(skip(self, cancel))]
    async fn list_products(
        &self,
        query: &QueryDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProductSummary>, CatalogError> {
        debug!("Sending request");
        let request = self.get(routes::PRODUCTS).query(query);
        cancellable(cancel, Self::fetch_json(routes::PRODUCTS, request)).await
    }

    #[instrument(skip(self, cancel))]
    async fn product_pages(
        &self,
        query: &QueryDescriptor,
        cancel: &CancellationToken,
    ) -> Result<u32, CatalogError> {
        debug!("Sending request");
        let request = self.get(routes::PRODUCT_PAGES).query(query);
        let count: PageCount =
            cancellable(cancel, Self::fetch_json(routes::PRODUCT_PAGES, request)).await?;
        Ok(count.pages)
    }

    #[instrument(skip(self))]
    async fn product_detail(&self, id: ProductId) -> Result<ProductDetail, CatalogError> {
        debug!("Sending request");
        let path = format!("{}/{id}/extended", routes::PRODUCTS);
        Self::fetch_json(&path, self.get(&path)).await
    }

    #[instrument(skip(self, cancel))]
    async fn search_tags(
        &self,
        query: &TagSearchQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<TagRef>, CatalogError> {
        debug!("Sending request");
        let request = self.get(routes::TAGS).query(query);
        cancellable(cancel, Self::fetch_json(routes::TAGS, request)).await
    }

    #[instrument(skip(self))]
    async fn tag(&self, id: TagId) -> Result<TagRef, CatalogError> {
        debug!("Sending request");
        let path = format!("{}/{id}", routes::TAGS);
        Self::fetch_json(&path, self.get(&path)).await
    }

    #[instrument(skip(self))]
    async fn product_comments(
        &self,
        product_id: ProductId,
        page: u32,
    ) -> Result<Vec<CommentWithUser>, CatalogError> {
        debug!("Sending request");
        let path = format!("/product/comment/withuser/product/{product_id}");
        let request = self.get(&path).query(&CommentPageQuery { page });
        Self::fetch_json(&path, request).await
    }

    #[instrument(skip(self))]
    async fn comment_pages(&self, product_id: ProductId) -> Result<u32, CatalogError> {
        debug!("Sending request");
        let path = format!("/product/comment/product/{product_id}/pages");
        let count: PageCount = Self::fetch_json(&path, self.get(&path)).await?;
        Ok(count.pages)
    }

    #[instrument(skip(self))]
    async fn product_image(&self, image_name: &str) -> Result<Vec<u8>, CatalogError> {
        debug!("Sending request");
        let path = format!("{}/{image_name}", routes::IMAGES);
        Self::fetch(&path, self.get(&path)).await
    }

    fn image_url(&self, image_name: &str) -> String {
        self.url(&format!("{}/{image_name}", routes::IMAGES))
    }
}
