//! Router tests against in-memory explorers and price feed

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use buyback_tracker::constants::{ARBITRUM_CONTRACT, ARBITRUM_GMX};
use buyback_tracker::testing::{StaticIndexer, StaticPriceFeed, token, transfer};
use buyback_tracker::{Config, Network, Tracker};
use buyback_web::router;

const OTHER: &str = "0x000000000000000000000000000000000000beef";
const ARB_USDC: &str = "0xff970a61a04b1ca14834a43f5de4533ebddb5cc8";

fn app() -> axum::Router {
    let gmx = token(ARBITRUM_GMX, "GMX", 18);
    let usdc = token(ARB_USDC, "USDC", 6);

    let arbitrum = StaticIndexer::new(Network::Arbitrum)
        .with_transaction(transfer(Network::Arbitrum, &gmx, ARBITRUM_CONTRACT, OTHER, "3000000000000000000"))
        .with_transaction(transfer(Network::Arbitrum, &usdc, OTHER, ARBITRUM_CONTRACT, "42000000"))
        .with_balance(ARBITRUM_GMX, "2000000000000000000")
        .with_balance(ARB_USDC, "42000000");
    let avalanche = StaticIndexer::new(Network::Avalanche);
    let feed = StaticPriceFeed::new(&[("gmx", 15.0), ("usd-coin", 1.0)]);

    let tracker = Tracker::new(Config::defaults().unwrap(), arbitrum, avalanche, feed);
    router(Arc::new(tracker))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn health() {
    let (status, json) = get(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn overview_endpoint() {
    let (status, json) = get(app(), "/api/overview").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["price"], 15.0);
    assert_eq!(json["outflow_transactions"].as_array().unwrap().len(), 1);
    assert_eq!(json["outflow_transactions"][0]["token_symbol"], "GMX");
    assert_eq!(json["balances"][0]["amount"], 2.0);
    assert_eq!(json["balances"][0]["usd_value"], 30.0);
}

#[tokio::test]
async fn portfolio_endpoint() {
    let (status, json) = get(app(), "/api/portfolio").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["arbitrum"]["total_usd"], 42.0 + 30.0);
    assert_eq!(json["avalanche"]["total_usd"], 0.0);
    assert_eq!(json["combined"]["token_count"], 2);
    assert_eq!(json["buyback_tokens"][0]["symbol"], "USDC");
    assert_eq!(json["buyback_tokens"][0]["network"], "arbitrum");
}

#[tokio::test]
async fn dashboard_endpoint_refetches() {
    let app = app();

    let (status, first) = get(app.clone(), "/api/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["overview"]["price"], 15.0);
    assert_eq!(first["portfolio"]["combined"]["total_usd"], 72.0);

    let (_, second) = get(app, "/api/dashboard").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn unknown_route() {
    let (status, _) = get(app(), "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
