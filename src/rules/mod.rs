pub mod violations;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::panel::Measurement;

pub use violations::evaluate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationReport {
    pub count: usize,
    pub per_field: BTreeMap<Measurement, bool>,
}

impl ViolationReport {
    pub fn is_clean(&self) -> bool {
        self.count == 0
    }

    pub fn is_violated(&self, measurement: Measurement) -> bool {
        self.per_field.get(&measurement).copied().unwrap_or(false)
    }

    /// Violating measurements in canonical order.
    pub fn violated(&self) -> Vec<Measurement> {
        Measurement::ALL
            .into_iter()
            .filter(|m| self.is_violated(*m))
            .collect()
    }
}
