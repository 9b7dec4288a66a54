use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::decision::PredictionRecord;

pub const HISTORY_HEADER: &str = "Gender\tAge\tWBC\tRBC\tPlatelets\tHemoglobin\tBlasts\tViolations\tClassifier\tOverride\tPrediction\tTimestamp";

pub fn write_history_tsv(path: &Path, records: &[PredictionRecord]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    write_history(&mut w, records)?;
    w.flush()?;
    Ok(())
}

pub fn write_history<W: Write>(w: &mut W, records: &[PredictionRecord]) -> Result<()> {
    writeln!(w, "{}", HISTORY_HEADER)?;
    for r in records {
        let p = &r.panel;
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            p.sex,
            p.age,
            p.wbc,
            p.rbc,
            p.platelets,
            p.hemoglobin,
            p.blasts,
            r.violation_count,
            r.classifier_label,
            if r.rule_override { "yes" } else { "no" },
            r.verdict,
            r.timestamp
        )?;
    }
    Ok(())
}
