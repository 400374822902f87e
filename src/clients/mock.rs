//! # Mock Catalog
//!
//! A scripted [`CatalogApi`] for exercising controllers without a server.
//!
//! Each operation has its own FIFO of expectations. A call pops the next one,
//! optionally sleeps for its delay (use paused tokio time in tests) and returns its
//! scripted result. Every call is recorded, so tests can assert on exactly what
//! the controllers requested.
//!
//! ```ignore
//! let mock = MockCatalog::new();
//! mock.expect_products().return_ok(vec![]);
//! mock.expect_product_pages().delay(Duration::from_millis(50)).return_ok(1);
//!
//! let api: Arc<dyn CatalogApi> = Arc::new(mock.clone());
//! // drive a controller...
//! mock.verify();
//! ```
//!
//! Cancellation tokens do not change the answer: a "cancelled" call still returns its
//! scripted result, which is what lets tests prove that late results are discarded.
//! The tokens are recorded instead ([`MockCatalog::tokens`]), so tests can check that
//! superseded work was cancelled at the transport.

use crate::clients::{CatalogApi, CatalogError};
use crate::model::{CommentWithUser, ProductDetail, ProductId, ProductSummary, TagId, TagRef};
use crate::query::{QueryDescriptor, TagSearchQuery};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A request as seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    ListProducts(QueryDescriptor),
    ProductPages(QueryDescriptor),
    ProductDetail(ProductId),
    SearchTags(TagSearchQuery),
    Tag(TagId),
    Comments { product_id: ProductId, page: u32 },
    CommentPages(ProductId),
    Image(String),
}

struct Scripted<T> {
    delay: Option<Duration>,
    response: Result<T, CatalogError>,
}

type Queue<T> = VecDeque<Scripted<T>>;

#[derive(Default)]
struct Script {
    products: Queue<Vec<ProductSummary>>,
    product_pages: Queue<u32>,
    details: Queue<ProductDetail>,
    tag_searches: Queue<Vec<TagRef>>,
    tags: Queue<TagRef>,
    comments: Queue<Vec<CommentWithUser>>,
    comment_pages: Queue<u32>,
    images: Queue<Vec<u8>>,
    calls: Vec<MockCall>,
    tokens: Vec<(MockCall, CancellationToken)>,
    unexpected: Vec<MockCall>,
}

impl Script {
    fn remaining(&self) -> usize {
        self.products.len()
            + self.product_pages.len()
            + self.details.len()
            + self.tag_searches.len()
            + self.tags.len()
            + self.comments.len()
            + self.comment_pages.len()
            + self.images.len()
    }
}

/// Scripted catalog with expectation tracking.
///
/// Clones share the same script, so keep one clone for assertions and hand
/// another to the code under test.
#[derive(Clone, Default)]
pub struct MockCatalog {
    script: Arc<Mutex<Script>>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn builder<T>(&self, queue: fn(&mut Script) -> &mut Queue<T>) -> ExpectationBuilder<T> {
        ExpectationBuilder {
            script: Arc::clone(&self.script),
            queue,
            delay: None,
        }
    }

    pub fn expect_products(&self) -> ExpectationBuilder<Vec<ProductSummary>> {
        self.builder(|s| &mut s.products)
    }

    pub fn expect_product_pages(&self) -> ExpectationBuilder<u32> {
        self.builder(|s| &mut s.product_pages)
    }

    pub fn expect_product_detail(&self) -> ExpectationBuilder<ProductDetail> {
        self.builder(|s| &mut s.details)
    }

    pub fn expect_tag_search(&self) -> ExpectationBuilder<Vec<TagRef>> {
        self.builder(|s| &mut s.tag_searches)
    }

    pub fn expect_tag(&self) -> ExpectationBuilder<TagRef> {
        self.builder(|s| &mut s.tags)
    }

    pub fn expect_comments(&self) -> ExpectationBuilder<Vec<CommentWithUser>> {
        self.builder(|s| &mut s.comments)
    }

    pub fn expect_comment_pages(&self) -> ExpectationBuilder<u32> {
        self.builder(|s| &mut s.comment_pages)
    }

    pub fn expect_image(&self) -> ExpectationBuilder<Vec<u8>> {
        self.builder(|s| &mut s.images)
    }

    /// Every call received so far, in arrival order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.script().calls.clone()
    }

    /// Calls matching `filter`, in arrival order.
    pub fn calls_where(&self, filter: impl Fn(&MockCall) -> bool) -> Vec<MockCall> {
        self.script().calls.iter().filter(|c| filter(c)).cloned().collect()
    }

    /// Cancellation tokens of cancellable calls, in arrival order.
    pub fn tokens(&self) -> Vec<(MockCall, CancellationToken)> {
        self.script().tokens.clone()
    }

    /// Tokens of the calls matching `filter`, in arrival order.
    pub fn tokens_where(&self, filter: impl Fn(&MockCall) -> bool) -> Vec<CancellationToken> {
        self.script()
            .tokens
            .iter()
            .filter(|(call, _)| filter(call))
            .map(|(_, token)| token.clone())
            .collect()
    }

    /// Panics unless every expectation was consumed and no call went unscripted.
    pub fn verify(&self) {
        let script = self.script();
        if !script.unexpected.is_empty() {
            panic!("Unexpected calls: {:?}", script.unexpected);
        }
        let remaining = script.remaining();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }

    async fn answer<T>(
        &self,
        call: MockCall,
        queue: fn(&mut Script) -> &mut Queue<T>,
    ) -> Result<T, CatalogError> {
        let next = {
            let mut script = self.script();
            script.calls.push(call.clone());
            let next = queue(&mut script).pop_front();
            if next.is_none() {
                script.unexpected.push(call.clone());
            }
            next
        };

        let Some(scripted) = next else {
            return Err(CatalogError::Network(format!("no expectation for {call:?}")));
        };
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        scripted.response
    }

    async fn answer_cancellable<T>(
        &self,
        call: MockCall,
        cancel: &CancellationToken,
        queue: fn(&mut Script) -> &mut Queue<T>,
    ) -> Result<T, CatalogError> {
        self.script().tokens.push((call.clone(), cancel.clone()));
        self.answer(call, queue).await
    }
}

/// Queues one scripted response for an operation.
pub struct ExpectationBuilder<T> {
    script: Arc<Mutex<Script>>,
    queue: fn(&mut Script) -> &mut Queue<T>,
    delay: Option<Duration>,
}

impl<T> ExpectationBuilder<T> {
    /// Holds the response back for `delay` after the call arrives.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn return_ok(self, value: T) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: CatalogError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<T, CatalogError>) {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        (self.queue)(&mut script).push_back(Scripted {
            delay: self.delay,
            response,
        });
    }
}

#[async_trait]
impl CatalogApi for MockCatalog {
    async fn list_products(
        &self,
        query: &QueryDescriptor,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProductSummary>, CatalogError> {
        self.answer_cancellable(MockCall::ListProducts(query.clone()), cancel, |s| {
            &mut s.products
        })
        .await
    }

    async fn product_pages(
        &self,
        query: &QueryDescriptor,
        cancel: &CancellationToken,
    ) -> Result<u32, CatalogError> {
        self.answer_cancellable(MockCall::ProductPages(query.clone()), cancel, |s| {
            &mut s.product_pages
        })
        .await
    }

    async fn product_detail(&self, id: ProductId) -> Result<ProductDetail, CatalogError> {
        self.answer(MockCall::ProductDetail(id), |s| &mut s.details).await
    }

    async fn search_tags(
        &self,
        query: &TagSearchQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<TagRef>, CatalogError> {
        self.answer_cancellable(MockCall::SearchTags(query.clone()), cancel, |s| {
            &mut s.tag_searches
        })
        .await
    }

    async fn tag(&self, id: TagId) -> Result<TagRef, CatalogError> {
        self.answer(MockCall::Tag(id), |s| &mut s.tags).await
    }

    async fn product_comments(
        &self,
        product_id: ProductId,
        page: u32,
    ) -> Result<Vec<CommentWithUser>, CatalogError> {
        self.answer(MockCall::Comments { product_id, page }, |s| &mut s.comments)
            .await
    }

    async fn comment_pages(&self, product_id: ProductId) -> Result<u32, CatalogError> {
        self.answer(MockCall::CommentPages(product_id), |s| &mut s.comment_pages)
            .await
    }

    async fn product_image(&self, image_name: &str) -> Result<Vec<u8>, CatalogError> {
        self.answer(MockCall::Image(image_name.to_string()), |s| &mut s.images)
            .await
    }

    fn image_url(&self, image_name: &str) -> String {
        format!("mock://product/image/{image_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_expectations_are_fifo_per_operation() {
        let mock = MockCatalog::new();
        mock.expect_comment_pages().return_ok(3);
        mock.expect_comment_pages().return_err(CatalogError::NotFound("x".into()));

        assert_eq!(mock.comment_pages(ProductId(1)).await, Ok(3));
        assert!(matches!(
            mock.comment_pages(ProductId(1)).await,
            Err(CatalogError::NotFound(_))
        ));
        assert_eq!(mock.calls().len(), 2);
        mock.verify();
    }

    #[tokio::test]
    async fn test_tokens_are_recorded_for_cancellable_calls() {
        let mock = MockCatalog::new();
        mock.expect_tag_search().return_ok(vec![]);
        mock.expect_tag().return_ok(TagRef::new(1, "mono"));

        let token = CancellationToken::new();
        mock.search_tags(&TagSearchQuery::by_name("mo", 10), &token)
            .await
            .unwrap();
        mock.tag(TagId(1)).await.unwrap();
        token.cancel();

        let tokens = mock.tokens();
        assert_eq!(tokens.len(), 1);
        assert!(matches!(tokens[0].0, MockCall::SearchTags(_)));
        assert!(tokens[0].1.is_cancelled());
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected calls")]
    async fn test_unscripted_call_fails_verify() {
        let mock = MockCatalog::new();
        assert!(mock.tag(TagId(9)).await.is_err());
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "1 remaining")]
    async fn test_leftover_expectation_fails_verify() {
        let mock = MockCatalog::new();
        mock.expect_image().return_ok(vec![1, 2, 3]);
        mock.verify();
    }
}
