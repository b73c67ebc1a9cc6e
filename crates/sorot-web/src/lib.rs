//! Query frontend for the indexed video library.
//!
//! Serves an embedded search page plus the JSON API it fetches. Search
//! responses from the Discovery engine are reshaped into the flat fields
//! the page renders.

mod handlers;
mod reshape;

use axum::routing::get;
use axum::Router;
use sorot_config::Config;
use sorot_discovery::DiscoveryClient;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use reshape::{reshape, ApiSearchResponse, SearchHit};

/// State shared across handlers.
pub struct AppState {
    pub search: DiscoveryClient,
    pub config: Config,
}

/// Build the router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/search", get(handlers::search))
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
        .with_state(state)
}
