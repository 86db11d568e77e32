//! Credit-risk scoring pipeline.
//!
//! Raw payload -> [`validate`] -> [`ApplicantInput`] -> [`features::engineer`] ->
//! [`DefaultPredictor`] -> [`PricingPolicy`] -> [`PredictionResult`]. Every stage
//! is a pure function of its input; the only long-lived state is the predictor
//! owned by [`CreditScoringService`].

pub mod domain;
pub mod features;
pub mod policy;
pub mod predictor;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantInput, Decision, Explanation, HomeOwnership, LoanIntent, PredictionResponse,
    PredictionResult, PriorDefault,
};
pub use features::{auto_assign_grade, reconcile, ColumnOrder, FeatureVector};
pub use policy::{PolicyError, PricingPolicy};
pub use predictor::{
    ArtifactPredictor, DefaultPredictor, ModelArtifact, PredictorInvocationError,
    PredictorLoadError,
};
pub use router::scoring_router;
pub use service::{CreditScoringService, ScoringError};
pub use validation::{validate, ApplicantPayload, FieldViolation, ValidationError, ViolationKind};
