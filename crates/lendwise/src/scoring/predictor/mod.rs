//! The trained classifier, seen as an opaque capability.
//!
//! Pipelines only depend on [`DefaultPredictor`]; [`ArtifactPredictor`] is the
//! production implementation backed by a JSON model artifact loaded once at
//! startup.

mod artifact;

pub use artifact::{ArtifactPredictor, LogisticRegression, ModelArtifact, Tree, TreeEnsemble, TreeNode};

use std::path::PathBuf;

use super::features::FeatureVector;

/// Capability exposed by a trained default classifier.
pub trait DefaultPredictor: Send + Sync {
    /// Feature order the model was fitted with, when the artifact records it.
    fn feature_names(&self) -> Option<&[String]>;

    /// Probability that the applicant behind `row` defaults.
    fn predict_default_probability(&self, row: &FeatureVector) -> Result<f64, PredictorInvocationError>;
}

impl<P: DefaultPredictor + ?Sized> DefaultPredictor for std::sync::Arc<P> {
    fn feature_names(&self) -> Option<&[String]> {
        (**self).feature_names()
    }

    fn predict_default_probability(&self, row: &FeatureVector) -> Result<f64, PredictorInvocationError> {
        (**self).predict_default_probability(row)
    }
}

/// The model artifact could not be turned into a usable predictor. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum PredictorLoadError {
    #[error("failed to read model artifact {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("model artifact {path} is not valid JSON: {source}")]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("model artifact {path} is inconsistent: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// The predictor failed while scoring a single row.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictorInvocationError {
    #[error("feature '{0}' required by the model is missing from the row")]
    MissingFeature(String),
    #[error("tree {tree} did not reach a leaf")]
    UnterminatedTree { tree: usize },
    #[error("model produced a non-finite probability ({0})")]
    NonFiniteOutput(f64),
    #[error("predictor unavailable: {0}")]
    Unavailable(String),
}
