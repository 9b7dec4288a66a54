use anyhow::{Result, bail};

use crate::ctx::Ctx;
use crate::decision::{PredictionRecord, Verdict};

pub fn format_summary(ctx: &Ctx) -> Result<String> {
    if ctx.history.is_empty() {
        bail!("no predictions recorded");
    }
    let version = env!("CARGO_PKG_VERSION");

    let mut out = String::new();
    out.push_str(&format!("kira-leukoscreen v{}\n", version));
    if let Some(table) = &ctx.reference {
        out.push_str(&format!(
            "Reference: {} ({})\n",
            table.version, table.source
        ));
    }

    for (i, record) in ctx.history.iter().enumerate() {
        out.push_str(&format_record(i + 1, record));
    }

    if ctx.history.len() > 1 {
        out.push_str(&format!(
            "Session: {} records, {} positive, {} negative, {} rule overrides\n",
            ctx.history.len(),
            ctx.history.count_verdict(Verdict::Positive),
            ctx.history.count_verdict(Verdict::Negative),
            ctx.history.rule_overrides()
        ));
    }
    Ok(out)
}

pub fn format_record(n: usize, record: &PredictionRecord) -> String {
    let p = &record.panel;
    let mut out = format!(
        "[{}] {}, age {}: Leukemia {}\n",
        n, p.sex, p.age, record.verdict
    );
    if record.violated.is_empty() {
        out.push_str("    Violations: 0\n");
    } else {
        let names: Vec<&str> = record.violated.iter().map(|m| m.name()).collect();
        out.push_str(&format!(
            "    Violations: {} ({})\n",
            record.violation_count,
            names.join(", ")
        ));
    }
    out.push_str(&format!(
        "    Classifier: {} (rule override: {})\n",
        record.classifier_label,
        if record.rule_override { "yes" } else { "no" }
    ));
    out.push_str(&format!("    Timestamp: {}\n", record.timestamp));
    out
}
