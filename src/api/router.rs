//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.

use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::recommend::RecommendationEngine;

/// Build the API router around an engine.
pub fn recommend_router(engine: RecommendationEngine) -> Router {
    build_router(ApiContext::new(engine))
}

fn build_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/recommend", post(endpoints::recommend::recommend))
        .with_state(ctx);

    Router::new().nest("/api", api)
}
