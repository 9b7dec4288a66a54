pub mod fusion;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classifier::Label;
use crate::panel::{Measurement, MeasurementPanel};

pub use fusion::{TIMESTAMP_FORMAT, decide, decide_at, fuse, screen, timestamp_now};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Positive,
    Negative,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Positive => "Positive",
            Verdict::Negative => "Negative",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finished prediction. Never mutated after `decide` builds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(flatten)]
    pub panel: MeasurementPanel,
    pub violation_count: usize,
    pub violated: Vec<Measurement>,
    pub classifier_label: Label,
    pub rule_override: bool,
    pub verdict: Verdict,
    pub timestamp: String,
}
