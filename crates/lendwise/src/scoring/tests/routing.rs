use super::common::*;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::scoring::policy::PricingPolicy;
use crate::scoring::router::{predict_handler, scoring_router};
use crate::scoring::service::CreditScoringService;
use crate::scoring::validation::ApplicantPayload;

fn predict_request(body: serde_json::Value) -> Request<axum::body::Body> {
    Request::post("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("body serializes"),
        ))
        .expect("request builds")
}

#[tokio::test]
async fn root_reports_status() {
    let (service, _) = fixed_service(0.1);
    let router = scoring_router(service);

    let response = router
        .oneshot(
            Request::get("/")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body,
        json!({ "status": "ok", "message": "Credit Risk API running" })
    );
}

#[tokio::test]
async fn predict_returns_priced_decision() {
    let (service, _) = fixed_service(0.5);
    let router = scoring_router(service);

    let response = router
        .oneshot(predict_request(scenario_json()))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["default_probability"], json!(0.5));
    assert_eq!(body["interest_rate_percent"], json!(12.5));
    assert_eq!(body["decision"], json!("REJECT"));
    assert_eq!(body["explain"]["threshold_used"], json!(0.35));
    assert_eq!(
        body["explain"]["note"],
        json!("Interest rate mapped linearly from predicted default probability (7%–18%).")
    );
}

#[tokio::test]
async fn predict_accepts_legacy_client_payload() {
    let (service, _) = fixed_service(0.0812);
    let router = scoring_router(service);

    let response = router
        .oneshot(predict_request(json!({
            "person_age": 30,
            "person_income": 60000,
            "person_emp_length": 2,
            "loan_amnt": 15000,
            "cb_person_default_on_file": "N",
            "cb_person_cred_hist_length": 6,
            "person_home_ownership": "RENT",
            "loan_intent": "PERSONAL"
        })))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["decision"], json!("ACCEPT"));
    assert_eq!(body["default_probability"], json!(0.0812));
}

#[tokio::test]
async fn predict_lists_field_errors() {
    let (service, predictor) = fixed_service(0.1);
    let router = scoring_router(service);
    let mut payload = scenario_json();
    payload["age"] = json!(15);
    payload["loan_intent"] = json!("GAMBLING");

    let response = router
        .oneshot(predict_request(payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["error"], json!("validation failed"));
    let detail = body["detail"].as_array().expect("detail list");
    assert_eq!(detail.len(), 2);
    assert_eq!(detail[0]["field"], json!("age"));
    assert_eq!(detail[0]["kind"], json!("below_minimum"));
    assert_eq!(detail[1]["field"], json!("loan_intent"));
    assert_eq!(detail[1]["kind"], json!("not_allowed"));
    assert_eq!(predictor.calls(), 0);
}

#[tokio::test]
async fn predict_handler_maps_predictor_failure_to_server_error() {
    let service = Arc::new(CreditScoringService::new(
        Arc::new(OfflinePredictor),
        PricingPolicy::default(),
    ));
    let payload: ApplicantPayload =
        serde_json::from_value(scenario_json()).expect("payload deserializes");

    let response = predict_handler::<OfflinePredictor>(State(service), axum::Json(payload)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("offline"));
}

#[tokio::test]
async fn malformed_json_is_rejected_by_extractor() {
    let (service, predictor) = fixed_service(0.1);
    let router = scoring_router(service);

    let response = router
        .oneshot(
            Request::post("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from("{\"age\": 30,"))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert!(response.status().is_client_error());
    assert_eq!(predictor.calls(), 0);
}
