use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::domain::{ApplicantInput, PredictionResult};
use super::features::{self, ColumnOrder, FeatureVector};
use super::policy::PricingPolicy;
use super::predictor::{DefaultPredictor, PredictorInvocationError};
use super::validation::{validate, ApplicantPayload, ValidationError};

/// Immutable scoring pipeline shared by every request.
///
/// The predictor's feature schema is read once here; requests only borrow the
/// service, so it can sit behind an `Arc` in router state without locking.
pub struct CreditScoringService<P> {
    predictor: Arc<P>,
    columns: ColumnOrder,
    policy: PricingPolicy,
}

impl<P> CreditScoringService<P>
where
    P: DefaultPredictor + 'static,
{
    pub fn new(predictor: Arc<P>, policy: PricingPolicy) -> Self {
        let columns = ColumnOrder::from_schema(predictor.feature_names());

        match &columns {
            ColumnOrder::Declared(names) => info!(
                feature_count = names.len(),
                column_order = columns.label(),
                "predictor declares its feature schema"
            ),
            ColumnOrder::Lexicographic => warn!(
                column_order = columns.label(),
                "predictor declares no feature schema; sorting columns by name, \
                 which may not match the order the model was trained with"
            ),
        }
        info!(
            accept_threshold = policy.accept_threshold(),
            rate_floor = policy.rate_floor(),
            rate_ceiling = policy.rate_ceiling(),
            "pricing policy loaded"
        );

        Self {
            predictor,
            columns,
            policy,
        }
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    pub fn column_order(&self) -> &ColumnOrder {
        &self.columns
    }

    /// Model input row for `applicant`, aligned to the predictor's schema.
    pub fn engineer(&self, applicant: &ApplicantInput) -> FeatureVector {
        features::engineer(applicant, &self.columns)
    }

    /// Score a validated applicant.
    pub fn score(&self, applicant: &ApplicantInput) -> Result<PredictionResult, PredictorInvocationError> {
        let effective_dti = applicant.effective_dti();
        let loan_grade = features::auto_assign_grade(
            applicant.income,
            effective_dti,
            applicant.credit_history_length_years,
            applicant.has_prior_default.is_yes(),
        );
        let row = self.engineer(applicant);

        let raw = self
            .predictor
            .predict_default_probability(&row)
            .map_err(|err| {
                error!(error = %err, "predictor invocation failed");
                err
            })?;
        if !raw.is_finite() {
            error!(probability = raw, "predictor returned a non-finite probability");
            return Err(PredictorInvocationError::NonFiniteOutput(raw));
        }
        let default_probability = raw.clamp(0.0, 1.0);
        if default_probability != raw {
            warn!(probability = raw, "predictor probability outside [0, 1]; clamped");
        }

        let interest_rate_percent = self.policy.interest_rate(default_probability);
        let decision = self.policy.decide(default_probability);

        debug!(
            loan_grade,
            effective_dti,
            default_probability,
            interest_rate_percent,
            decision = decision.label(),
            "applicant scored"
        );

        Ok(PredictionResult {
            default_probability,
            interest_rate_percent,
            decision,
            loan_grade,
            effective_dti,
        })
    }

    /// Validate a raw payload and score it. Validation failures never reach the
    /// predictor.
    pub fn score_payload(&self, payload: ApplicantPayload) -> Result<PredictionResult, ScoringError> {
        let applicant = validate(payload)?;
        Ok(self.score(&applicant)?)
    }
}

/// Error raised by the scoring service.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Predictor(#[from] PredictorInvocationError),
}
