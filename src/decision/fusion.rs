use chrono::Local;

use crate::classifier::{Classifier, Label};
use crate::decision::{PredictionRecord, Verdict};
use crate::error::ScreenError;
use crate::panel::MeasurementPanel;
use crate::reference::ReferenceTable;
use crate::rules::{ViolationReport, evaluate};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Any violation forces Positive. The rules never turn a model Positive into Negative.
pub fn fuse(violation_count: usize, label: Label) -> Verdict {
    if violation_count > 0 {
        return Verdict::Positive;
    }
    match label {
        Label::Positive => Verdict::Positive,
        Label::Negative => Verdict::Negative,
    }
}

pub fn decide(panel: &MeasurementPanel, report: &ViolationReport, label: Label) -> PredictionRecord {
    decide_at(panel, report, label, timestamp_now())
}

pub fn decide_at(
    panel: &MeasurementPanel,
    report: &ViolationReport,
    label: Label,
    timestamp: String,
) -> PredictionRecord {
    let verdict = fuse(report.count, label);
    PredictionRecord {
        panel: panel.clone(),
        violation_count: report.count,
        violated: report.violated(),
        classifier_label: label,
        rule_override: report.count > 0 && label == Label::Negative,
        verdict,
        timestamp,
    }
}

/// Evaluate, classify, decide. Either a complete record or an error.
pub fn screen(
    panel: &MeasurementPanel,
    table: &ReferenceTable,
    classifier: &dyn Classifier,
) -> Result<PredictionRecord, ScreenError> {
    let report = evaluate(panel, table)?;
    let label = classifier.predict(&panel.features())?;
    Ok(decide(panel, &report, label))
}

pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
