use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{DefaultPredictor, PredictorInvocationError, PredictorLoadError};
use crate::scoring::features::FeatureVector;

/// Serialized model exported by the training notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression(LogisticRegression),
    GradientBoostedTrees(TreeEnsemble),
}

/// `p = sigmoid(intercept + sum(coefficient * feature))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub intercept: f64,
    pub coefficients: BTreeMap<String, f64>,
}

/// Boosted binary trees; the summed leaf margins go through a sigmoid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    #[serde(default)]
    pub base_margin: f64,
    pub trees: Vec<Tree>,
}

/// Flat node list; node `id` must equal its position and node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

/// A split (`feature`, `threshold`, `left`, `right`) or a `leaf`. Rows with
/// `value < threshold` go left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf: Option<f64>,
}

impl TreeNode {
    pub fn leaf(id: usize, value: f64) -> Self {
        Self {
            id,
            feature: None,
            threshold: None,
            left: None,
            right: None,
            leaf: Some(value),
        }
    }

    pub fn split(id: usize, feature: &str, threshold: f64, left: usize, right: usize) -> Self {
        Self {
            id,
            feature: Some(feature.to_string()),
            threshold: Some(threshold),
            left: Some(left),
            right: Some(right),
            leaf: None,
        }
    }
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LogisticRegression(_) => "logistic_regression",
            Self::GradientBoostedTrees(_) => "gradient_boosted_trees",
        }
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        match self {
            Self::LogisticRegression(model) => model.feature_names.as_deref(),
            Self::GradientBoostedTrees(model) => model.feature_names.as_deref(),
        }
    }

    /// Structural checks that would otherwise surface on the first request.
    pub fn check(&self) -> Result<(), String> {
        let declared = match self.feature_names() {
            Some(names) => {
                let mut seen = HashSet::new();
                for name in names {
                    if !seen.insert(name.as_str()) {
                        return Err(format!("feature '{name}' is declared twice"));
                    }
                }
                Some(seen)
            }
            None => None,
        };
        let ensure_declared = |feature: &str| match &declared {
            Some(names) if !names.contains(feature) => Err(format!(
                "feature '{feature}' is used by the model but not declared"
            )),
            _ => Ok(()),
        };

        match self {
            Self::LogisticRegression(model) => {
                if !model.intercept.is_finite() {
                    return Err("intercept must be finite".to_string());
                }
                for (feature, weight) in &model.coefficients {
                    if !weight.is_finite() {
                        return Err(format!("coefficient for '{feature}' must be finite"));
                    }
                    ensure_declared(feature.as_str())?;
                }
            }
            Self::GradientBoostedTrees(model) => {
                if !model.base_margin.is_finite() {
                    return Err("base_margin must be finite".to_string());
                }
                if model.trees.is_empty() {
                    return Err("ensemble has no trees".to_string());
                }
                for (tree_index, tree) in model.trees.iter().enumerate() {
                    tree.check(tree_index, &ensure_declared)?;
                }
            }
        }

        Ok(())
    }
}

impl Tree {
    fn check(
        &self,
        tree_index: usize,
        ensure_declared: &dyn Fn(&str) -> Result<(), String>,
    ) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("tree {tree_index} has no nodes"));
        }
        let len = self.nodes.len();
        for (position, node) in self.nodes.iter().enumerate() {
            if node.id != position {
                return Err(format!(
                    "tree {tree_index}: node at position {position} has id {}",
                    node.id
                ));
            }
            match (node.leaf, &node.feature, node.threshold, node.left, node.right) {
                (Some(value), None, None, None, None) => {
                    if !value.is_finite() {
                        return Err(format!("tree {tree_index}: leaf {position} is not finite"));
                    }
                }
                (None, Some(feature), Some(threshold), Some(left), Some(right)) => {
                    if !threshold.is_finite() {
                        return Err(format!(
                            "tree {tree_index}: node {position} threshold is not finite"
                        ));
                    }
                    if left >= len || right >= len {
                        return Err(format!(
                            "tree {tree_index}: node {position} points outside the tree"
                        ));
                    }
                    ensure_declared(feature.as_str())?;
                }
                _ => {
                    return Err(format!(
                        "tree {tree_index}: node {position} must be either a leaf or a complete split"
                    ))
                }
            }
        }
        Ok(())
    }

    fn margin(&self, tree_index: usize, row: &FeatureVector) -> Result<f64, PredictorInvocationError> {
        let mut position = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..self.nodes.len() {
            let Some(node) = self.nodes.get(position) else {
                break;
            };
            if let Some(value) = node.leaf {
                return Ok(value);
            }
            let (Some(feature), Some(threshold), Some(left), Some(right)) =
                (&node.feature, node.threshold, node.left, node.right)
            else {
                break;
            };
            let value = row
                .get(feature)
                .ok_or_else(|| PredictorInvocationError::MissingFeature(feature.clone()))?;
            position = if value < threshold { left } else { right };
        }
        Err(PredictorInvocationError::UnterminatedTree { tree: tree_index })
    }
}

impl LogisticRegression {
    fn margin(&self, row: &FeatureVector) -> Result<f64, PredictorInvocationError> {
        self.coefficients
            .iter()
            .try_fold(self.intercept, |acc, (feature, weight)| {
                row.get(feature)
                    .map(|value| acc + weight * value)
                    .ok_or_else(|| PredictorInvocationError::MissingFeature(feature.clone()))
            })
    }
}

impl TreeEnsemble {
    fn margin(&self, row: &FeatureVector) -> Result<f64, PredictorInvocationError> {
        self.trees
            .iter()
            .enumerate()
            .try_fold(self.base_margin, |acc, (index, tree)| {
                tree.margin(index, row).map(|leaf| acc + leaf)
            })
    }
}

fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

/// Predictor backed by a [`ModelArtifact`] read once from disk.
#[derive(Debug, Clone)]
pub struct ArtifactPredictor {
    artifact: ModelArtifact,
    source: PathBuf,
}

impl ArtifactPredictor {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PredictorLoadError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| PredictorLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw, path)
    }

    pub fn from_json(raw: &str, source: impl Into<PathBuf>) -> Result<Self, PredictorLoadError> {
        let source = source.into();
        let artifact: ModelArtifact =
            serde_json::from_str(raw).map_err(|err| PredictorLoadError::Format {
                path: source.clone(),
                source: err,
            })?;
        Self::from_artifact(artifact, source)
    }

    pub fn from_artifact(
        artifact: ModelArtifact,
        source: impl Into<PathBuf>,
    ) -> Result<Self, PredictorLoadError> {
        let source = source.into();
        artifact
            .check()
            .map_err(|reason| PredictorLoadError::Invalid {
                path: source.clone(),
                reason,
            })?;
        Ok(Self { artifact, source })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl DefaultPredictor for ArtifactPredictor {
    fn feature_names(&self) -> Option<&[String]> {
        self.artifact.feature_names()
    }

    fn predict_default_probability(&self, row: &FeatureVector) -> Result<f64, PredictorInvocationError> {
        let margin = match &self.artifact {
            ModelArtifact::LogisticRegression(model) => model.margin(row)?,
            ModelArtifact::GradientBoostedTrees(model) => model.margin(row)?,
        };
        let probability = sigmoid(margin);
        if probability.is_finite() {
            Ok(probability)
        } else {
            Err(PredictorInvocationError::NonFiniteOutput(probability))
        }
    }
}
