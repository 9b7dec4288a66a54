use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::classifier::{Classifier, Label};
use crate::error::ScreenError;
use crate::panel::{FEATURE_NAMES, FeatureVector, N_FEATURES};

pub const MODEL_FORMAT: &str = "kira-leukoscreen-forest";
pub const MODEL_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        probability: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Nodes are stored in preorder: the root is index 0 and children always
/// come after their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
}

impl DecisionTree {
    /// Probability of the positive class at the leaf reached by `x`.
    pub fn predict_proba(&self, x: &[f64; N_FEATURES]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { probability } => return *probability,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    fn validate(&self, tree_idx: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("tree {} has no nodes", tree_idx));
        }
        let n = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { probability } => {
                    if !(0.0..=1.0).contains(probability) {
                        return Err(format!(
                            "tree {} node {} probability {} out of [0, 1]",
                            tree_idx, idx, probability
                        ));
                    }
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= N_FEATURES {
                        return Err(format!(
                            "tree {} node {} feature index {} out of range",
                            tree_idx, idx, feature
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!(
                            "tree {} node {} has non-finite threshold",
                            tree_idx, idx
                        ));
                    }
                    if *left <= idx || *right <= idx || *left >= n || *right >= n {
                        return Err(format!(
                            "tree {} node {} has invalid children ({}, {})",
                            tree_idx, idx, left, right
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub algorithm: String,
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub seed: u64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub accuracy: Option<f64>,
    pub trained_at: String,
    pub tool_version: String,
}

/// Serialized random forest. Predicts 1 when the mean leaf probability
/// across trees exceeds 0.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    pub format: String,
    pub version: String,
    pub features: Vec<String>,
    pub trees: Vec<DecisionTree>,
    pub meta: ModelMeta,
}

impl ForestModel {
    pub fn new(trees: Vec<DecisionTree>, meta: ModelMeta) -> Self {
        Self {
            format: MODEL_FORMAT.to_string(),
            version: MODEL_VERSION.to_string(),
            features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            trees,
            meta,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ScreenError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScreenError::ClassifierUnavailable(format!(
                "failed to read model {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content).map_err(|e| match e {
            ScreenError::ClassifierUnavailable(msg) => {
                ScreenError::ClassifierUnavailable(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, ScreenError> {
        let model: ForestModel = serde_json::from_str(content)
            .map_err(|e| ScreenError::ClassifierUnavailable(format!("malformed model: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn predict_proba(&self, x: &[f64; N_FEATURES]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict_proba(x)).sum();
        sum / self.trees.len() as f64
    }

    fn validate(&self) -> Result<(), ScreenError> {
        let unavailable = ScreenError::ClassifierUnavailable;
        if self.format != MODEL_FORMAT {
            return Err(unavailable(format!(
                "unsupported model format '{}'",
                self.format
            )));
        }
        if self.version != MODEL_VERSION {
            return Err(unavailable(format!(
                "unsupported model version '{}'",
                self.version
            )));
        }
        if self.features != FEATURE_NAMES {
            return Err(unavailable(format!(
                "feature order mismatch: expected {:?}, got {:?}",
                FEATURE_NAMES, self.features
            )));
        }
        if self.trees.is_empty() {
            return Err(unavailable("model has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i).map_err(unavailable)?;
        }
        Ok(())
    }
}

impl Classifier for ForestModel {
    fn name(&self) -> &str {
        &self.meta.algorithm
    }

    fn predict(&self, features: &FeatureVector) -> Result<Label, ScreenError> {
        let x = &features.0;
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ScreenError::ClassifierUnavailable(
                "non-finite feature value".to_string(),
            ));
        }
        if self.predict_proba(x) > 0.5 {
            Ok(Label::Positive)
        } else {
            Ok(Label::Negative)
        }
    }
}
