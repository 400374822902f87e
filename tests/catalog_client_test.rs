use econest_storefront::clients::{CatalogApi, CatalogClient, CatalogError};
use econest_storefront::model::{ProductId, TagId, TagRef};
use econest_storefront::query::{build_query, FilterState, TagSearchQuery};
use mockito::{Matcher, Server};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const PRODUCTS: &str = r#"[{
    "id": 7, "name": "Mono 400W Panel", "slug": "mono-400w-panel", "price": 250.0,
    "createdAt": "2025-03-01T10:00:00Z", "updatedAt": "2025-03-01T10:00:00Z",
    "subcategoryId": 3, "averageScore": 4.5, "totalQuantity": 2
}]"#;

const COMMENTS: &str = r#"[{
    "id": 1, "scoring": 4, "comment": "Great output",
    "createdAt": "2025-04-01T08:30:00Z", "updatedAt": "2025-04-01T08:30:00Z",
    "productId": 42,
    "user": {"id": 3, "fullName": "Grace", "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"}
}]"#;

#[tokio::test]
async fn test_list_products_sends_short_query_keys() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/product")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("k".into(), "panel".into()),
            Matcher::UrlEncoded("minq".into(), "1".into()),
            Matcher::UrlEncoded("maxq".into(), "4".into()),
            Matcher::UrlEncoded("tags".into(), "3,8".into()),
            Matcher::UrlEncoded("p".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(PRODUCTS)
        .create_async()
        .await;

    let state = FilterState {
        keyword: "panel".into(),
        show_low_stock: true,
        tags: vec![TagRef::new(3, "mono"), TagRef::new(8, "roof")],
        ..FilterState::default()
    };
    let client = CatalogClient::new(server.url()).unwrap();
    let products = client
        .list_products(&build_query(&state), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, ProductId(7));
    assert!(products[0].is_low_stock());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_page_counts_and_comments() {
    let mut server = Server::new_async().await;
    let pages = server
        .mock("GET", "/product/comment/product/42/pages")
        .with_status(200)
        .with_body(r#"{"pages": 3}"#)
        .create_async()
        .await;
    let comments = server
        .mock("GET", "/product/comment/withuser/product/42")
        .match_query(Matcher::UrlEncoded("p".into(), "2".into()))
        .with_status(200)
        .with_body(COMMENTS)
        .create_async()
        .await;

    let client = CatalogClient::new(server.url()).unwrap();
    assert_eq!(client.comment_pages(ProductId(42)).await, Ok(3));

    let page = client.product_comments(ProductId(42), 2).await.unwrap();
    assert_eq!(page[0].author_name(), "Grace");
    assert_eq!(page[0].created_at.to_rfc3339(), "2025-04-01T08:30:00+00:00");

    pages.assert_async().await;
    comments.assert_async().await;
}

#[tokio::test]
async fn test_tag_search_and_lookup() {
    let mut server = Server::new_async().await;
    let search = server
        .mock("GET", "/product/tag")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("name".into(), "mo".into()),
            Matcher::UrlEncoded("lim".into(), "10".into()),
            Matcher::UrlEncoded("offst".into(), "0".into()),
        ]))
        .with_status(200)
        .with_body(r#"[{"id": 1, "name": "mono"}]"#)
        .create_async()
        .await;
    let lookup = server
        .mock("GET", "/product/tag/9")
        .with_status(200)
        .with_body(r#"{"id": 9, "name": "hybrid", "createdAt": "2025-01-01T00:00:00Z", "updatedAt": "2025-01-01T00:00:00Z"}"#)
        .create_async()
        .await;

    let client = CatalogClient::new(server.url()).unwrap();
    let tags = client
        .search_tags(&TagSearchQuery::by_name("mo", 10), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(tags, vec![TagRef::new(1, "mono")]);

    let tag = client.tag(TagId(9)).await.unwrap();
    assert_eq!(tag.name, "hybrid");
    assert!(tag.created_at.is_some());

    search.assert_async().await;
    lookup.assert_async().await;
}

#[tokio::test]
async fn test_status_mapping() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/product/404/extended")
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/product/500/extended")
        .with_status(500)
        .create_async()
        .await;

    let client = CatalogClient::new(server.url()).unwrap();
    assert!(matches!(
        client.product_detail(ProductId(404)).await,
        Err(CatalogError::NotFound(_))
    ));
    assert!(matches!(
        client.product_detail(ProductId(500)).await,
        Err(CatalogError::Network(_))
    ));
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/product")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(PRODUCTS.replace("2025-03-01T10:00:00Z", "last tuesday"))
        .create_async()
        .await;
    server
        .mock("GET", "/product/pages")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let client = CatalogClient::new(server.url()).unwrap();
    let query = build_query(&FilterState::default());
    let token = CancellationToken::new();
    assert!(matches!(
        client.list_products(&query, &token).await,
        Err(CatalogError::Parse(_))
    ));
    assert!(matches!(
        client.product_pages(&query, &token).await,
        Err(CatalogError::Parse(_))
    ));
}

#[tokio::test]
async fn test_image_bytes() {
    let mut server = Server::new_async().await;
    let image = server
        .mock("GET", "/product/image/panel.webp")
        .with_status(200)
        .with_header("content-type", "image/webp")
        .with_body([0x52u8, 0x49, 0x46, 0x46])
        .create_async()
        .await;

    let client = CatalogClient::new(server.url()).unwrap();
    assert_eq!(
        client.product_image("panel.webp").await.unwrap(),
        vec![0x52, 0x49, 0x46, 0x46]
    );
    assert_eq!(
        client.image_url("panel.webp"),
        format!("{}/product/image/panel.webp", server.url())
    );
    image.assert_async().await;
}

#[tokio::test]
async fn test_cancellation_drops_request() {
    // Accepts the connection and never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        std::future::pending::<()>().await;
    });

    let client = CatalogClient::new(format!("http://{addr}")).unwrap();
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let result = client
        .list_products(&build_query(&FilterState::default()), &token)
        .await;
    assert_eq!(result.unwrap_err(), CatalogError::Cancelled);
}
