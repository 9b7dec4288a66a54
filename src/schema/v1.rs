use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeRow {
    pub gender: String,
    pub parameter: String,
    pub min: f64,
    pub max: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceMeta {
    pub version: String,
    pub source: String,
    pub ranges: Vec<RangeRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRef {
    pub path: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordV1 {
    pub gender: String,
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
    pub violations: usize,
    pub violated: Vec<String>,
    pub classifier_label: u8,
    pub rule_override: bool,
    pub prediction: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub rule_overrides: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeukoScreenV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub reference: Option<ReferenceMeta>,
    pub model: Option<ModelRef>,
    pub records: Vec<RecordV1>,
    pub summary: SessionSummary,
}

impl LeukoScreenV1 {
    pub fn empty(tool_version: &str) -> Self {
        Self {
            tool: "kira-leukoscreen".to_string(),
            version: tool_version.to_string(),
            schema_version: "v1".to_string(),
            reference: None,
            model: None,
            records: Vec::new(),
            summary: SessionSummary {
                total: 0,
                positive: 0,
                negative: 0,
                rule_overrides: 0,
            },
        }
    }
}
