//! Recommendation endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::PatientProfile;
use crate::recommend::Decision;

/// `POST /api/recommend`: one symptom report in, one decision out.
///
/// Malformed JSON and out-of-range fields are both 400s. The engine
/// runs on the blocking pool because the advisory call may block.
pub async fn recommend(
    State(ctx): State<ApiContext>,
    payload: Result<Json<PatientProfile>, JsonRejection>,
) -> Result<Json<Decision>, ApiError> {
    let request_id = Uuid::new_v4();
    let Json(patient) = payload.map_err(|rejection| {
        tracing::info!(%request_id, status = %rejection.status(), "Rejected recommend payload");
        ApiError::from(rejection)
    })?;

    let span = tracing::info_span!("recommend", %request_id);
    let engine = ctx.engine.clone();
    let decision = tokio::task::spawn_blocking(move || {
        let _guard = span.enter();
        engine.recommend(&patient)
    })
    .await??;

    tracing::info!(%request_id, triage = decision.is_triage(), "Recommendation served");
    Ok(Json(decision))
}
