use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::predictor::DefaultPredictor;
use super::service::{CreditScoringService, ScoringError};
use super::validation::ApplicantPayload;

/// Router builder exposing the status and scoring endpoints.
pub fn scoring_router<P>(service: Arc<CreditScoringService<P>>) -> Router
where
    P: DefaultPredictor + 'static,
{
    Router::new()
        .route("/", get(root_handler))
        .route("/predict", post(predict_handler::<P>))
        .with_state(service)
}

pub(crate) async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "message": "Credit Risk API running" }))
}

pub(crate) async fn predict_handler<P>(
    State(service): State<Arc<CreditScoringService<P>>>,
    Json(payload): Json<ApplicantPayload>,
) -> Response
where
    P: DefaultPredictor + 'static,
{
    match service.score_payload(payload) {
        Ok(result) => {
            let body = result.response(service.policy());
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(ScoringError::Validation(error)) => {
            let payload = json!({
                "error": "validation failed",
                "detail": error.violations,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(ScoringError::Predictor(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
