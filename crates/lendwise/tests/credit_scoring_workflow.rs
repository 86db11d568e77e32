//! End-to-end scoring through the public service facade and HTTP router, using
//! the sample model artifact shipped with the repository.

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{header, Request, StatusCode};
use lendwise::scoring::predictor::{Tree, TreeEnsemble, TreeNode};
use lendwise::scoring::{
    scoring_router, validate, ApplicantPayload, ArtifactPredictor, ColumnOrder,
    CreditScoringService, Decision, DefaultPredictor, ModelArtifact, PredictionResponse,
    PricingPolicy,
};
use serde_json::json;
use tower::ServiceExt;

fn sample_model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../models/credit_risk_model.json")
}

fn sample_service() -> Arc<CreditScoringService<ArtifactPredictor>> {
    let predictor = ArtifactPredictor::load(sample_model_path()).expect("sample model loads");
    Arc::new(CreditScoringService::new(
        Arc::new(predictor),
        PricingPolicy::default(),
    ))
}

fn payload(value: serde_json::Value) -> ApplicantPayload {
    serde_json::from_value(value).expect("payload deserializes")
}

fn strong_applicant() -> serde_json::Value {
    json!({
        "age": 30,
        "income": 60000,
        "employment_length_years": 4,
        "loan_amount": 12000,
        "has_prior_default": "N",
        "credit_history_length_years": 6,
        "home_ownership": "MORTGAGE",
        "loan_intent": "EDUCATION"
    })
}

fn weak_applicant() -> serde_json::Value {
    json!({
        "age": 22,
        "income": 18000,
        "employment_length_years": 0,
        "loan_amount": 15000,
        "has_prior_default": "Y",
        "credit_history_length_years": 2,
        "home_ownership": "RENT",
        "loan_intent": "MEDICAL"
    })
}

#[test]
fn sample_model_declares_training_schema() {
    let service = sample_service();

    match service.column_order() {
        ColumnOrder::Declared(names) => {
            assert_eq!(names.len(), 18);
            assert_eq!(names[0], "person_age");
            assert_eq!(names[7], "loan_grade");
        }
        ColumnOrder::Lexicographic => panic!("sample model should declare its schema"),
    }
}

#[test]
fn strong_applicant_is_accepted_and_weak_one_rejected() {
    let service = sample_service();

    let strong = service
        .score_payload(payload(strong_applicant()))
        .expect("strong applicant scores");
    let weak = service
        .score_payload(payload(weak_applicant()))
        .expect("weak applicant scores");

    assert_eq!(strong.loan_grade, 2);
    assert_eq!(strong.decision, Decision::Accept);
    assert_eq!(weak.loan_grade, 7);
    assert_eq!(weak.decision, Decision::Reject);
    assert!(strong.default_probability < weak.default_probability);
    assert!(strong.interest_rate_percent < weak.interest_rate_percent);
    for result in [&strong, &weak] {
        assert!((0.0..=1.0).contains(&result.default_probability));
        assert!((7.0..=18.0).contains(&result.interest_rate_percent));
    }
}

#[test]
fn scoring_is_deterministic() {
    let service = sample_service();
    let applicant = validate(payload(strong_applicant())).expect("valid applicant");

    let first = service.score(&applicant).expect("scores");
    let second = service.score(&applicant).expect("scores");

    assert_eq!(first, second);
}

#[tokio::test]
async fn predict_route_serves_sample_model() {
    let router = scoring_router(sample_service());

    let response = router
        .oneshot(
            Request::post("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&weak_applicant()).expect("serializes"),
                ))
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let body: PredictionResponse = serde_json::from_slice(&bytes).expect("response parses");
    assert_eq!(body.decision, Decision::Reject);
    assert_eq!(body.explain.threshold_used, 0.35);
    // Presentation rounding: at most 4 and 2 decimal places.
    assert_eq!(
        body.default_probability,
        (body.default_probability * 1e4).round() / 1e4
    );
    assert_eq!(
        body.interest_rate_percent,
        (body.interest_rate_percent * 1e2).round() / 1e2
    );
}

#[test]
fn tree_ensemble_without_schema_scores_on_sorted_columns() {
    let ensemble = TreeEnsemble {
        feature_names: None,
        base_margin: -0.5,
        trees: vec![Tree {
            nodes: vec![
                TreeNode::split(0, "loan_grade", 4.5, 1, 2),
                TreeNode::leaf(1, -1.0),
                TreeNode::leaf(2, 2.0),
            ],
        }],
    };
    let predictor = ArtifactPredictor::from_artifact(
        ModelArtifact::GradientBoostedTrees(ensemble),
        "inline-trees",
    )
    .expect("ensemble valid");
    assert!(predictor.feature_names().is_none());
    let service = CreditScoringService::new(Arc::new(predictor), PricingPolicy::default());

    let strong = service
        .score_payload(payload(strong_applicant()))
        .expect("scores");
    let weak = service
        .score_payload(payload(weak_applicant()))
        .expect("scores");

    assert_eq!(service.column_order(), &ColumnOrder::Lexicographic);
    assert_eq!(strong.decision, Decision::Accept);
    assert_eq!(weak.decision, Decision::Reject);
    let row = service.engineer(&validate(payload(strong_applicant())).expect("valid"));
    let names: Vec<&str> = row.names().collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
}

#[test]
fn missing_artifact_fails_fast() {
    let err = ArtifactPredictor::load(sample_model_path().with_file_name("absent_model.json"))
        .expect_err("artifact missing");

    assert!(err.to_string().contains("absent_model.json"));
}
