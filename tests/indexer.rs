//! Indexer client against a mock server: parsing, caching, error mapping,
//! retries, and pool resolution falling back to the indexer listing.

mod common;

use common::{config, StubChain};
use deepbook_bot::client::DeepBookBot;
use deepbook_bot::error::{HttpError, SdkError};
use deepbook_bot::http::client::IndexerHttp;
use deepbook_bot::http::retry::{RetryConfig, RetryPolicy};

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAL_POOL_ID: &str = "0x00000000000000000000000000000000000000000000000000000000000000c1";

fn pools_body() -> Value {
    json!([
        {
            "pool_id": WAL_POOL_ID,
            "pool_name": "WAL_DBUSDC",
            "base_asset_id": "0000000000000000000000000000000000000000000000000000000000000c2::wal::WAL",
            "base_asset_decimals": 9,
            "base_asset_symbol": "WAL",
            "quote_asset_id": "0000000000000000000000000000000000000000000000000000000000000c3::dbusdc::DBUSDC",
            "quote_asset_decimals": 6,
            "quote_asset_symbol": "DBUSDC",
            "min_size": 1000000000,
            "lot_size": 100000000,
            "tick_size": 1000
        },
        {
            "pool_id": "not-an-id",
            "pool_name": "BROKEN",
            "base_asset_id": "x::y::Z",
            "base_asset_decimals": 9,
            "base_asset_symbol": "Z",
            "quote_asset_id": "x::y::Q",
            "quote_asset_decimals": 6,
            "quote_asset_symbol": "Q"
        }
    ])
}

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy::Custom(RetryConfig {
        max_retries,
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        backoff_factor: 2.0,
        jitter: false,
        retryable_statuses: vec![503],
    })
}

async fn indexer(server: &MockServer, retry: RetryPolicy) -> IndexerHttp {
    IndexerHttp::new(&server.uri(), Duration::from_secs(5))
        .unwrap()
        .with_retry(retry)
}

#[tokio::test]
async fn test_get_pools_parses_and_caches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_pools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pools_body()))
        .expect(1)
        .mount(&server)
        .await;

    let http = indexer(&server, RetryPolicy::None).await;
    let first = http.get_pools().await.unwrap();
    let second = http.get_pools().await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first[0].pool_name, "WAL_DBUSDC");
    assert_eq!(first[0].tick_size, Some(1000));
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_not_found_maps_to_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_pools"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such route"))
        .mount(&server)
        .await;

    let http = indexer(&server, RetryPolicy::Idempotent).await;
    match http.get_pools().await {
        Err(HttpError::NotFound(body)) => assert_eq!(body, "no such route"),
        other => panic!("expected NotFound, got {:?}", other.map(|p| p.len())),
    }
}

#[tokio::test]
async fn test_server_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_pools"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let http = indexer(&server, RetryPolicy::None).await;
    match http.get_pools().await {
        Err(HttpError::ServerError { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected ServerError, got {:?}", other.map(|p| p.len())),
    }
}

#[tokio::test]
async fn test_retries_unavailable_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_pools"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get_pools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pools_body()))
        .expect(1)
        .mount(&server)
        .await;

    let http = indexer(&server, fast_retry(3)).await;
    assert_eq!(http.get_pools().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_retries_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_pools"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let http = indexer(&server, fast_retry(2)).await;
    match http.get_pools().await {
        Err(HttpError::MaxRetriesExceeded { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected MaxRetriesExceeded, got {:?}", other.map(|p| p.len())),
    }
}

#[tokio::test]
async fn test_unknown_pool_resolves_through_indexer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get_pools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pools_body()))
        .expect(1)
        .mount(&server)
        .await;

    let bot = DeepBookBot::builder(config(&[]))
        .chain(Arc::new(StubChain::new()))
        .indexer(indexer(&server, RetryPolicy::None).await)
        .build()
        .unwrap();

    let pool = bot.pools().resolve("wal_dbusdc").await.unwrap();
    assert_eq!(pool.key, "WAL_DBUSDC");
    assert_eq!(pool.base.decimals, 9);
    assert!(pool.base.coin_type.starts_with("0x"));

    // Cached by key and by id; the listing is not fetched again.
    let by_id = bot.pools().resolve(WAL_POOL_ID).await.unwrap();
    assert_eq!(by_id.key, "WAL_DBUSDC");

    // Invalid entries are skipped rather than failing the listing.
    let listed = bot.pools().list().await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_unknown_pool_without_indexer() {
    let bot = DeepBookBot::builder(config(&[]))
        .chain(Arc::new(StubChain::new()))
        .build()
        .unwrap();
    match bot.pools().resolve("WAL_DBUSDC").await {
        Err(SdkError::Validation(message)) => assert!(message.contains("Unknown pool WAL_DBUSDC")),
        Err(other) => panic!("unexpected error {}", other),
        Ok(pool) => panic!("resolved {}", pool.key),
    }
}
