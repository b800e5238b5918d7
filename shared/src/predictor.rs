//! Regression predictor seam and the persisted tree-ensemble model

use std::io::Read;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ArtifactError;
use crate::features::FeatureVector;

/// Failure raised by a predictor while scoring
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct PredictorError(pub String);

/// Opaque scoring function trained offline and loaded read-only at startup
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictorError>;
}

impl<F> Predictor for F
where
    F: Fn(&FeatureVector) -> Result<f64, PredictorError> + Send + Sync,
{
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictorError> {
        self(features)
    }
}

/// Node of a regression tree, stored flat with child indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Walk from the root; a valid tree reaches a leaf within `nodes.len()` steps
    fn evaluate(&self, x: &[f64]) -> Result<f64, PredictorError> {
        let mut idx = 0;
        for _ in 0..self.nodes.len() {
            let node = self
                .nodes
                .get(idx)
                .ok_or_else(|| PredictorError(format!("node {} does not exist", idx)))?;
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = x.get(*feature).ok_or_else(|| {
                        PredictorError(format!("node {} splits on unknown feature {}", idx, feature))
                    })?;
                    idx = if *value <= *threshold { *left } else { *right };
                }
            }
        }
        Err(PredictorError("tree walk did not reach a leaf".to_string()))
    }

    /// Children must point forward, which rules out cycles
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= n_features {
                    return Err(format!("node {} splits on unknown feature {}", idx, feature));
                }
                for child in [*left, *right] {
                    if child <= idx || child >= self.nodes.len() {
                        return Err(format!("node {} has invalid child {}", idx, child));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Averaging ensemble of regression trees (random forest)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_features: usize,
    pub trees: Vec<RegressionTree>,
}

impl TreeEnsemble {
    pub fn new(trees: Vec<RegressionTree>) -> Result<Self, ArtifactError> {
        let model = Self {
            n_features: FeatureVector::LEN,
            trees,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn from_json<R: Read>(reader: R) -> Result<Self, ArtifactError> {
        let model: TreeEnsemble = serde_json::from_reader(reader)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.n_features != FeatureVector::LEN {
            return Err(ArtifactError::Invalid(format!(
                "model expects {} features, feature vector has {}",
                self.n_features,
                FeatureVector::LEN
            )));
        }
        if self.trees.is_empty() {
            return Err(ArtifactError::Invalid("model has no trees".to_string()));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| ArtifactError::Invalid(format!("tree {}: {}", idx, e)))?;
        }
        Ok(())
    }
}

impl Predictor for TreeEnsemble {
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictorError> {
        let x = features.to_array();
        if let Some(pos) = x.iter().position(|v| !v.is_finite()) {
            return Err(PredictorError(format!("feature {} is not finite", pos)));
        }
        if self.trees.is_empty() {
            return Err(PredictorError("model has no trees".to_string()));
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(&x)?;
        }
        let score = total / self.trees.len() as f64;

        if !score.is_finite() {
            return Err(PredictorError(format!("model produced {}", score)));
        }
        Ok(score)
    }
}
