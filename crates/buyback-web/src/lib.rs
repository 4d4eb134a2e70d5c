//! JSON API over the buyback tracker.
//!
//! Each endpoint runs one tracker entry point per request; nothing is cached.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use buyback_tracker::indexer::Indexer;
use buyback_tracker::prices::PriceFeed;
use buyback_tracker::{Dashboard, FullPortfolio, GovernanceOverview, Tracker};

pub fn router<I, P>(tracker: Arc<Tracker<I, P>>) -> Router
where
    I: Indexer + 'static,
    P: PriceFeed + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/api/overview", get(overview::<I, P>))
        .route("/api/portfolio", get(portfolio::<I, P>))
        .route("/api/dashboard", get(dashboard::<I, P>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(tracker)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "buyback-web",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "healthy",
    }))
}

async fn overview<I, P>(State(tracker): State<Arc<Tracker<I, P>>>) -> Json<GovernanceOverview>
where
    I: Indexer + 'static,
    P: PriceFeed + 'static,
{
    Json(tracker.fetch_governance_overview().await)
}

/// Always 200: a failed run comes back as the empty portfolio
async fn portfolio<I, P>(State(tracker): State<Arc<Tracker<I, P>>>) -> Json<FullPortfolio>
where
    I: Indexer + 'static,
    P: PriceFeed + 'static,
{
    Json(tracker.fetch_full_portfolio().await)
}

async fn dashboard<I, P>(State(tracker): State<Arc<Tracker<I, P>>>) -> Json<Dashboard>
where
    I: Indexer + 'static,
    P: PriceFeed + 'static,
{
    Json(tracker.fetch_dashboard().await)
}
