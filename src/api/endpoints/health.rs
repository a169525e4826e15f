//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub advisory_configured: bool,
    pub advisory_ok: bool,
}

/// `GET /api/health`: liveness plus advisory reachability.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let advisor = ctx.engine.advisor().cloned();
    let advisory_configured = advisor.is_some();

    let advisory_ok = match advisor {
        Some(advisor) => {
            // The advisory client is blocking.
            match tokio::task::spawn_blocking(move || advisor.is_available()).await? {
                Ok(available) => available,
                Err(e) => {
                    tracing::debug!(error = %e, "Advisory health check failed");
                    false
                }
            }
        }
        None => false,
    };

    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        advisory_configured,
        advisory_ok,
    }))
}
