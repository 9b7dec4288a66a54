use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::panel::{Measurement, Sex};
use crate::reference::{RangeEntry, ReferenceRange};

pub fn load_builtin_v1() -> Result<Vec<RangeEntry>> {
    let content = include_str!("../../assets/reference/ranges_v1.tsv");
    parse_ranges_tsv(content, "built-in v1")
}

pub fn load_ranges_tsv(path: &Path) -> Result<Vec<RangeEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read reference ranges TSV {}", path.display()))?;
    parse_ranges_tsv(&content, &path.display().to_string())
}

pub fn parse_ranges_tsv(content: &str, source: &str) -> Result<Vec<RangeEntry>> {
    let mut out = Vec::new();
    let mut seen: HashSet<(Sex, Measurement)> = HashSet::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = trimmed.split('\t').map(str::trim).collect();
        if parts.len() != 4 {
            bail!("{}:{} malformed TSV (expected 4 columns)", source, line_no);
        }
        let sex: Sex = parts[0]
            .parse()
            .with_context(|| format!("{}:{} invalid sex", source, line_no))?;
        let measurement: Measurement = parts[1]
            .parse()
            .with_context(|| format!("{}:{} invalid measurement", source, line_no))?;
        let low = parse_bound(parts[2], source, line_no)?;
        let high = parse_bound(parts[3], source, line_no)?;
        let range = ReferenceRange::new(low, high)
            .with_context(|| format!("{}:{} {} {}", source, line_no, sex, measurement))?;

        if !seen.insert((sex, measurement)) {
            bail!(
                "{}:{} duplicate range for {} {}",
                source,
                line_no,
                sex,
                measurement
            );
        }
        out.push(RangeEntry {
            sex,
            measurement,
            range,
        });
    }

    Ok(out)
}

fn parse_bound(field: &str, source: &str, line_no: usize) -> Result<f64> {
    field
        .parse::<f64>()
        .with_context(|| format!("{}:{} invalid bound '{}'", source, line_no, field))
}
