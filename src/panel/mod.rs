use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::error::ScreenError;

pub const N_FEATURES: usize = 6;

/// Accepted patient age in years, inclusive.
pub const MIN_AGE: u32 = 1;
pub const MAX_AGE: u32 = 120;

/// Classifier input columns, in the order the model was trained on.
pub const FEATURE_NAMES: [&str; N_FEATURES] =
    ["Age", "WBC", "RBC", "Platelets", "Hemoglobin", "Blasts"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn index(self) -> usize {
        match self {
            Sex::Male => 0,
            Sex::Female => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            other => bail!("unknown sex '{}' (expected Male or Female)", other),
        }
    }
}

/// The five range-checked measurements. Age is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Measurement {
    #[serde(rename = "WBC")]
    Wbc,
    #[serde(rename = "RBC")]
    Rbc,
    Platelets,
    Hemoglobin,
    Blasts,
}

impl Measurement {
    pub const ALL: [Measurement; 5] = [
        Measurement::Wbc,
        Measurement::Rbc,
        Measurement::Platelets,
        Measurement::Hemoglobin,
        Measurement::Blasts,
    ];

    pub fn index(self) -> usize {
        match self {
            Measurement::Wbc => 0,
            Measurement::Rbc => 1,
            Measurement::Platelets => 2,
            Measurement::Hemoglobin => 3,
            Measurement::Blasts => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Measurement::Wbc => "WBC",
            Measurement::Rbc => "RBC",
            Measurement::Platelets => "Platelets",
            Measurement::Hemoglobin => "Hemoglobin",
            Measurement::Blasts => "Blasts",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Measurement::Wbc => "/uL",
            Measurement::Rbc => "million/uL",
            Measurement::Platelets => "/uL",
            Measurement::Hemoglobin => "g/dL",
            Measurement::Blasts => "%",
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Measurement {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        for m in Measurement::ALL {
            if m.name().to_ascii_lowercase() == key {
                return Ok(m);
            }
        }
        bail!("unknown measurement '{}'", s.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPanel {
    pub sex: Sex,
    pub age: u32,
    #[serde(rename = "WBC")]
    pub wbc: f64,
    #[serde(rename = "RBC")]
    pub rbc: f64,
    #[serde(rename = "Platelets")]
    pub platelets: f64,
    #[serde(rename = "Hemoglobin")]
    pub hemoglobin: f64,
    #[serde(rename = "Blasts")]
    pub blasts: f64,
}

impl MeasurementPanel {
    pub fn new(
        sex: Sex,
        age: u32,
        wbc: f64,
        rbc: f64,
        platelets: f64,
        hemoglobin: f64,
        blasts: f64,
    ) -> Result<Self, ScreenError> {
        let panel = Self {
            sex,
            age,
            wbc,
            rbc,
            platelets,
            hemoglobin,
            blasts,
        };
        for m in Measurement::ALL {
            let v = panel.value(m);
            if !v.is_finite() {
                return Err(ScreenError::InvalidPanel(format!(
                    "{} must be a finite number, got {}",
                    m, v
                )));
            }
        }
        Ok(panel)
    }

    pub fn value(&self, measurement: Measurement) -> f64 {
        match measurement {
            Measurement::Wbc => self.wbc,
            Measurement::Rbc => self.rbc,
            Measurement::Platelets => self.platelets,
            Measurement::Hemoglobin => self.hemoglobin,
            Measurement::Blasts => self.blasts,
        }
    }

    pub fn features(&self) -> FeatureVector {
        FeatureVector([
            self.age as f64,
            self.wbc,
            self.rbc,
            self.platelets,
            self.hemoglobin,
            self.blasts,
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; N_FEATURES]);
