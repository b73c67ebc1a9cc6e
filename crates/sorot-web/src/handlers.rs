//! HTTP handlers for the query frontend.

use crate::reshape::{reshape, ApiSearchResponse};
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::error;

/// Embedded search page.
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

/// Run a search and reshape the response for the page.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = params.q.trim();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Query parameter required" })),
        )
            .into_response();
    }

    match state.search.search(query, &BTreeMap::new()).await {
        Ok(page) => Json(reshape(page)).into_response(),
        Err(e) => {
            error!("Search failed: {}", e);
            // Backend errors go back as a 200 payload the page displays inline
            Json(ApiSearchResponse::from_error(e.to_string())).into_response()
        }
    }
}

/// Liveness and configuration status.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "config_valid": state.config.validate_search().is_ok(),
    }))
}
