//! Integration tests for `JsonFeedAdapter` against a `wiremock` feed.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelfdb_core::{AdapterKind, ProductRef, SourceConfig};
use shelfdb_scraper::{
    AdapterOptions, FetchRelay, JsonFeedAdapter, RelayOptions, ScraperError, SiteAdapter,
};

fn adapter(server: &MockServer) -> JsonFeedAdapter {
    let relay = FetchRelay::direct(&RelayOptions {
        timeout_secs: 5,
        user_agent: "shelfdb-test/0.1".to_owned(),
    })
    .expect("relay");
    let source = SourceConfig {
        source_type: "Amazon".to_owned(),
        source_name: "Beauty Select".to_owned(),
        adapter: AdapterKind::JsonFeed,
        url: format!("{}/feeds/items.json", server.uri()),
        slug: Some("amazon-beauty-select".to_owned()),
    };
    JsonFeedAdapter::new(&source, Arc::new(relay), AdapterOptions::default()).expect("adapter")
}

#[tokio::test]
async fn list_products_resolves_relative_urls_and_keeps_asin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feeds/items.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": 1, "url": "items/1.json", "asin": "B0SERUM001"},
                {"id": "two", "url": format!("{}/detail/two.json", server.uri())}
            ]
        })))
        .mount(&server)
        .await;

    let refs = adapter(&server).list_products().await.expect("list");

    assert_eq!(refs.len(), 2);
    assert_eq!(refs[0].id, "1");
    assert_eq!(refs[0].url, format!("{}/feeds/items/1.json", server.uri()));
    assert_eq!(refs[0].asin.as_deref(), Some("B0SERUM001"));
    assert_eq!(refs[1].id, "two");
    assert!(refs[1].asin.is_none());
}

#[tokio::test]
async fn fetch_detail_accepts_numeric_prices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feeds/items/1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Vitamin C Serum",
            "price": 1980,
            "sale_price": "¥1,580",
            "image_url": "https://cdn.example.com/serum.jpg"
        })))
        .mount(&server)
        .await;

    let item = ProductRef {
        id: "1".to_owned(),
        url: format!("{}/feeds/items/1.json", server.uri()),
        asin: Some("B0SERUM001".to_owned()),
    };
    let raw = adapter(&server).fetch_detail(&item).await.expect("detail");

    assert_eq!(raw.name, "Vitamin C Serum");
    assert_eq!(raw.price, "1980");
    assert_eq!(raw.sale_price.as_deref(), Some("¥1,580"));
    assert_eq!(raw.asin.as_deref(), Some("B0SERUM001"));
}

#[tokio::test]
async fn fetch_detail_propagates_upstream_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let item = ProductRef {
        id: "9".to_owned(),
        url: format!("{}/feeds/items/9.json", server.uri()),
        asin: None,
    };
    let err = adapter(&server)
        .fetch_detail(&item)
        .await
        .expect_err("500 must fail");
    assert_eq!(err.upstream_status(), Some(500));
}

#[tokio::test]
async fn unusable_item_url_is_listed_and_fails_on_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feeds/items.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": 1, "url": "items/1.json"},
                {"id": 2, "url": "http://[broken"}
            ]
        })))
        .mount(&server)
        .await;

    let adapter = adapter(&server);
    let refs = adapter.list_products().await.expect("list");
    assert_eq!(refs.len(), 2);
    assert_eq!(refs[1].url, "http://[broken");

    let err = adapter
        .fetch_detail(&refs[1])
        .await
        .expect_err("unusable url must fail");
    assert!(matches!(err, ScraperError::InvalidUrl { .. }));
}

#[tokio::test]
async fn fetch_detail_trims_name_and_asin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feeds/items/3.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "  Sheet Mask 5P \n",
            "price": "¥980",
            "asin": " B0MASK0005 "
        })))
        .mount(&server)
        .await;

    let item = ProductRef {
        id: "3".to_owned(),
        url: format!("{}/feeds/items/3.json", server.uri()),
        asin: None,
    };
    let raw = adapter(&server).fetch_detail(&item).await.expect("detail");

    assert_eq!(raw.name, "Sheet Mask 5P");
    assert_eq!(raw.asin.as_deref(), Some("B0MASK0005"));
}
