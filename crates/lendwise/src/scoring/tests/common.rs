use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::{json, Value};

use crate::scoring::domain::{ApplicantInput, HomeOwnership, LoanIntent, PriorDefault};
use crate::scoring::features::FeatureVector;
use crate::scoring::policy::PricingPolicy;
use crate::scoring::predictor::{DefaultPredictor, PredictorInvocationError};
use crate::scoring::service::CreditScoringService;

/// Column order of the frame the classifier was fitted on.
pub(super) fn training_schema() -> Vec<String> {
    [
        "person_age",
        "person_income",
        "person_emp_length",
        "loan_amnt",
        "loan_percent_income",
        "cb_person_default_on_file",
        "cb_person_cred_hist_length",
        "loan_grade",
        "home_RENT",
        "home_MORTGAGE",
        "home_OWN",
        "home_OTHER",
        "loan_PERSONAL",
        "loan_EDUCATION",
        "loan_DEBTCONSOLIDATION",
        "loan_HOMEIMPROVEMENT",
        "loan_MEDICAL",
        "loan_VENTURE",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Mortgage holder borrowing for education with no explicit DTI.
pub(super) fn scenario_applicant() -> ApplicantInput {
    ApplicantInput {
        age: 30,
        income: 60_000,
        employment_length_years: 4.0,
        loan_amount: 12_000,
        loan_percent_income: None,
        has_prior_default: PriorDefault::No,
        credit_history_length_years: 6,
        home_ownership: HomeOwnership::Mortgage,
        loan_intent: LoanIntent::Education,
    }
}

pub(super) fn scenario_json() -> Value {
    json!({
        "age": 30,
        "income": 60000,
        "employment_length_years": 4.0,
        "loan_amount": 12000,
        "has_prior_default": "N",
        "credit_history_length_years": 6,
        "home_ownership": "MORTGAGE",
        "loan_intent": "EDUCATION"
    })
}

/// Predictor returning a fixed probability and recording what it saw.
pub(super) struct FixedPredictor {
    probability: f64,
    schema: Option<Vec<String>>,
    calls: AtomicUsize,
    last_row: Mutex<Option<FeatureVector>>,
}

impl FixedPredictor {
    pub(super) fn new(probability: f64) -> Self {
        Self::with_schema(probability, Some(training_schema()))
    }

    pub(super) fn with_schema(probability: f64, schema: Option<Vec<String>>) -> Self {
        Self {
            probability,
            schema,
            calls: AtomicUsize::new(0),
            last_row: Mutex::new(None),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn last_row(&self) -> Option<FeatureVector> {
        self.last_row.lock().expect("row mutex poisoned").clone()
    }
}

impl DefaultPredictor for FixedPredictor {
    fn feature_names(&self) -> Option<&[String]> {
        self.schema.as_deref()
    }

    fn predict_default_probability(
        &self,
        row: &FeatureVector,
    ) -> Result<f64, PredictorInvocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_row.lock().expect("row mutex poisoned") = Some(row.clone());
        Ok(self.probability)
    }
}

/// Predictor whose backend is always down.
pub(super) struct OfflinePredictor;

impl DefaultPredictor for OfflinePredictor {
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    fn predict_default_probability(
        &self,
        _row: &FeatureVector,
    ) -> Result<f64, PredictorInvocationError> {
        Err(PredictorInvocationError::Unavailable(
            "model backend offline".to_string(),
        ))
    }
}

pub(super) fn fixed_service(
    probability: f64,
) -> (Arc<CreditScoringService<FixedPredictor>>, Arc<FixedPredictor>) {
    let predictor = Arc::new(FixedPredictor::new(probability));
    let service = Arc::new(CreditScoringService::new(
        predictor.clone(),
        PricingPolicy::default(),
    ));
    (service, predictor)
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is json")
}
