//! Direct relays against ambient proxy variables.
//!
//! Kept in its own test binary because it mutates process environment.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelfdb_scraper::{FetchRelay, RelayOptions};

const PROXY_VARS: [&str; 4] = ["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"];

#[tokio::test]
async fn direct_fetch_ignores_and_preserves_proxy_env() {
    let trap = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("trapped"))
        .expect(0)
        .mount(&trap)
        .await;

    let target = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("direct"))
        .expect(1)
        .mount(&target)
        .await;

    for var in PROXY_VARS {
        std::env::set_var(var, trap.uri());
    }
    std::env::remove_var("NO_PROXY");
    std::env::remove_var("no_proxy");

    let relay = FetchRelay::direct(&RelayOptions {
        timeout_secs: 5,
        user_agent: "shelfdb-test/0.1".to_owned(),
    })
    .expect("relay");
    let asset = relay
        .fetch(&format!("{}/catalog.json", target.uri()))
        .await
        .expect("direct fetch succeeds");

    assert_eq!(asset.bytes, b"direct");
    for var in PROXY_VARS {
        assert_eq!(std::env::var(var).as_deref(), Ok(trap.uri().as_str()));
    }
    assert!(trap.received_requests().await.unwrap_or_default().is_empty());
    trap.verify().await;
    target.verify().await;
}
