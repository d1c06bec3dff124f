//! Serialized position-model artifact
//!
//! The artifact is produced by an external training pipeline and consumed
//! here as-is: metadata fixes the feature order and input arity, parameters
//! describe a standard scaler feeding a weighted blend of base learners.
//! Everything is validated once at load; `predict` only checks arity.

use serde::Deserialize;
use std::path::Path;

use crate::features::{FeatureSchema, FeatureVector};
use crate::{PodiumError, Result};

/// Artifact metadata: the feature-order contract
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactMeta {
    /// Model input fields, in the exact order the model expects
    pub feature_names: Vec<String>,
    /// Expected input arity; defaults to `feature_names.len()`
    pub in_dim: Option<usize>,
    pub version: Option<String>,
}

/// Per-feature standard scaler applied before the learners
#[derive(Debug, Clone, Deserialize)]
struct Scaler {
    means: Vec<f32>,
    stds: Vec<f32>,
}

impl Scaler {
    fn transform(&self, input: &[f32]) -> Vec<f32> {
        input
            .iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(x, (mean, std))| (x - mean) / std)
            .collect()
    }
}

/// One regressor in the stacked ensemble
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum BaseLearner {
    /// Ridge/Lasso-style linear regressor
    Linear { coefficients: Vec<f32>, intercept: f32 },
    /// Gradient-boosted regression trees
    TreeEnsemble { base_score: f32, trees: Vec<Tree> },
}

impl BaseLearner {
    fn kind_name(&self) -> &'static str {
        match self {
            BaseLearner::Linear { .. } => "linear",
            BaseLearner::TreeEnsemble { .. } => "tree_ensemble",
        }
    }

    fn evaluate(&self, scaled: &[f32]) -> f32 {
        match self {
            BaseLearner::Linear {
                coefficients,
                intercept,
            } => {
                let dot: f32 = coefficients.iter().zip(scaled).map(|(c, x)| c * x).sum();
                dot + intercept
            }
            BaseLearner::TreeEnsemble { base_score, trees } => {
                base_score + trees.iter().map(|t| t.evaluate(scaled)).sum::<f32>()
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Tree {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f32,
    },
}

impl Tree {
    fn evaluate(&self, scaled: &[f32]) -> f32 {
        // Child indices are validated at load to point strictly forward, so
        // this walk terminates
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if scaled[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Final weighted combination of the base learners
#[derive(Debug, Clone, Deserialize)]
struct Blend {
    weights: Vec<f32>,
    intercept: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct ArtifactJson {
    meta: ArtifactMeta,
    scaler: Scaler,
    learners: Vec<BaseLearner>,
    blend: Blend,
}

/// A loaded, validated position model
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    meta: ArtifactMeta,
    scaler: Scaler,
    learners: Vec<BaseLearner>,
    blend: Blend,
    arity: usize,
}

impl ModelArtifact {
    /// Load and validate an artifact from disk.
    ///
    /// A missing file is `NoModel`; any inconsistency in the parsed artifact
    /// is `Artifact` and fatal at startup rather than at predict time.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PodiumError::NoModel);
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate an artifact from its JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: ArtifactJson = serde_json::from_str(json)?;
        Self::validate(parsed)
    }

    fn validate(parsed: ArtifactJson) -> Result<Self> {
        let ArtifactJson {
            meta,
            scaler,
            learners,
            blend,
        } = parsed;

        if meta.feature_names.is_empty() {
            return Err(PodiumError::Artifact("empty feature_names".to_string()));
        }
        let arity = meta.in_dim.unwrap_or(meta.feature_names.len());
        if arity != meta.feature_names.len() {
            return Err(PodiumError::Artifact(format!(
                "in_dim {} does not match {} feature names",
                arity,
                meta.feature_names.len()
            )));
        }

        if scaler.means.len() != arity || scaler.stds.len() != arity {
            return Err(PodiumError::Artifact(format!(
                "scaler length {}/{} does not match arity {}",
                scaler.means.len(),
                scaler.stds.len(),
                arity
            )));
        }
        if scaler.stds.iter().any(|s| *s <= 0.0) {
            return Err(PodiumError::Artifact(
                "scaler stds must be positive".to_string(),
            ));
        }

        if learners.is_empty() {
            return Err(PodiumError::Artifact("no base learners".to_string()));
        }
        for (i, learner) in learners.iter().enumerate() {
            Self::validate_learner(i, learner, arity)?;
        }

        if blend.weights.len() != learners.len() {
            return Err(PodiumError::Artifact(format!(
                "{} blend weights for {} learners",
                blend.weights.len(),
                learners.len()
            )));
        }

        Ok(ModelArtifact {
            meta,
            scaler,
            learners,
            blend,
            arity,
        })
    }

    fn validate_learner(index: usize, learner: &BaseLearner, arity: usize) -> Result<()> {
        match learner {
            BaseLearner::Linear { coefficients, .. } => {
                if coefficients.len() != arity {
                    return Err(PodiumError::Artifact(format!(
                        "learner {}: {} coefficients for arity {}",
                        index,
                        coefficients.len(),
                        arity
                    )));
                }
            }
            BaseLearner::TreeEnsemble { trees, .. } => {
                for (t, tree) in trees.iter().enumerate() {
                    if tree.nodes.is_empty() {
                        return Err(PodiumError::Artifact(format!(
                            "learner {}: tree {} has no nodes",
                            index, t
                        )));
                    }
                    for (n, node) in tree.nodes.iter().enumerate() {
                        if let TreeNode::Split {
                            feature,
                            left,
                            right,
                            ..
                        } = node
                        {
                            if *feature >= arity {
                                return Err(PodiumError::Artifact(format!(
                                    "learner {}: tree {} splits on feature {} (arity {})",
                                    index, t, feature, arity
                                )));
                            }
                            // Forward-only children guarantee the walk terminates
                            if *left >= tree.nodes.len()
                                || *right >= tree.nodes.len()
                                || *left <= n
                                || *right <= n
                            {
                                return Err(PodiumError::Artifact(format!(
                                    "learner {}: tree {} node {} has invalid children",
                                    index, t, n
                                )));
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Predicted finishing position for one feature vector.
    ///
    /// The only runtime check is the vector's arity; the artifact never
    /// validates the numeric plausibility of its own output.
    pub fn predict(&self, vector: &FeatureVector) -> Result<f32> {
        if vector.len() != self.arity {
            return Err(PodiumError::FeatureArityMismatch {
                got: vector.len(),
                expected: self.arity,
            });
        }

        let scaled = self.scaler.transform(vector.as_slice());
        let blended: f32 = self
            .learners
            .iter()
            .zip(self.blend.weights.iter())
            .map(|(learner, weight)| weight * learner.evaluate(&scaled))
            .sum();

        Ok(blended + self.blend.intercept)
    }

    /// Expected input arity
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Feature order the artifact was trained against
    pub fn schema(&self) -> FeatureSchema {
        FeatureSchema::new(self.meta.feature_names.clone())
    }

    pub fn version(&self) -> Option<&str> {
        self.meta.version.as_deref()
    }

    /// Learner kinds in blend order, for `model info`
    pub fn learner_kinds(&self) -> Vec<&'static str> {
        self.learners.iter().map(|l| l.kind_name()).collect()
    }
}
