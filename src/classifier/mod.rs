pub mod dataset;
pub mod forest;
pub mod train;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScreenError;
use crate::panel::FeatureVector;

pub use forest::{DecisionTree, ForestModel, ModelMeta, Node};

/// Raw binary classifier output: 1 = leukemia, 0 = no leukemia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    Negative,
    Positive,
}

impl Label {
    pub fn as_u8(self) -> u8 {
        match self {
            Label::Negative => 0,
            Label::Positive => 1,
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> Self {
        label.as_u8()
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::Negative),
            1 => Ok(Label::Positive),
            other => Err(format!("label must be 0 or 1, got {}", other)),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Anything that maps the six-feature vector to a binary label.
pub trait Classifier: fmt::Debug {
    fn name(&self) -> &str;
    fn predict(&self, features: &FeatureVector) -> Result<Label, ScreenError>;
}

/// Always answers the same label. Useful where no trained model is at hand.
#[derive(Debug, Clone, Copy)]
pub struct FixedClassifier(pub Label);

impl Classifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    fn predict(&self, _features: &FeatureVector) -> Result<Label, ScreenError> {
        Ok(self.0)
    }
}
