use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::decision::{PredictionRecord, Verdict};
use crate::history::History;
use crate::reference::ReferenceTable;
use crate::schema::v1::{LeukoScreenV1, ModelRef, RangeRow, RecordV1, ReferenceMeta, SessionSummary};

pub fn build_report(ctx: &Ctx) -> LeukoScreenV1 {
    let reference = ctx.reference.as_ref().map(reference_meta);
    let model = ctx.classifier.as_ref().map(|c| ModelRef {
        path: Some(ctx.model_path.display().to_string()),
        name: c.name().to_string(),
    });

    LeukoScreenV1 {
        tool: "kira-leukoscreen".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema_version: "v1".to_string(),
        reference,
        model,
        records: ctx.history.iter().map(record_v1).collect(),
        summary: session_summary(&ctx.history),
    }
}

pub fn write_json(path: &Path, report: &LeukoScreenV1) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

pub fn reference_meta(table: &ReferenceTable) -> ReferenceMeta {
    ReferenceMeta {
        version: table.version.clone(),
        source: table.source.clone(),
        ranges: table
            .entries()
            .into_iter()
            .map(|e| RangeRow {
                gender: e.sex.to_string(),
                parameter: e.measurement.to_string(),
                min: e.range.low(),
                max: e.range.high(),
                unit: e.measurement.unit().to_string(),
            })
            .collect(),
    }
}

pub fn record_v1(record: &PredictionRecord) -> RecordV1 {
    let p = &record.panel;
    RecordV1 {
        gender: p.sex.to_string(),
        age: p.age,
        wbc: p.wbc,
        rbc: p.rbc,
        platelets: p.platelets,
        hemoglobin: p.hemoglobin,
        blasts: p.blasts,
        violations: record.violation_count,
        violated: record.violated.iter().map(|m| m.to_string()).collect(),
        classifier_label: record.classifier_label.as_u8(),
        rule_override: record.rule_override,
        prediction: record.verdict.to_string(),
        timestamp: record.timestamp.clone(),
    }
}

fn session_summary(history: &History) -> SessionSummary {
    SessionSummary {
        total: history.len(),
        positive: history.count_verdict(Verdict::Positive),
        negative: history.count_verdict(Verdict::Negative),
        rule_overrides: history.rule_overrides(),
    }
}
