use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::io::{column_index, split_csv_line};
use crate::panel::{MAX_AGE, MIN_AGE, MeasurementPanel, Sex};

pub const PANEL_COLUMNS: [&str; 7] = [
    "Gender",
    "Age",
    "WBC",
    "RBC",
    "Platelets",
    "Hemoglobin",
    "Blasts",
];

pub fn read_panels(path: &Path) -> Result<Vec<MeasurementPanel>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read panels CSV {}", path.display()))?;
    parse_panels_csv(&content, &path.display().to_string())
}

pub fn parse_panels_csv(content: &str, source: &str) -> Result<Vec<MeasurementPanel>> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty() && !l.trim_start().starts_with('#'));

    let (_, header_line) = lines
        .next()
        .ok_or_else(|| anyhow::anyhow!("{}: panels CSV is empty", source))?;
    let header = split_csv_line(header_line);
    let mut cols = [0usize; 7];
    for (slot, name) in cols.iter_mut().zip(PANEL_COLUMNS) {
        *slot = column_index(&header, name, source)?;
    }

    let mut panels = Vec::new();
    for (idx, line) in lines {
        let line_no = idx + 1;
        let fields = split_csv_line(line);
        if fields.len() != header.len() {
            bail!(
                "{}:{} expected {} columns, found {}",
                source,
                line_no,
                header.len(),
                fields.len()
            );
        }

        let sex: Sex = fields[cols[0]]
            .parse()
            .with_context(|| format!("{}:{}:{}", source, line_no, cols[0] + 1))?;
        let age: u32 = fields[cols[1]].parse().with_context(|| {
            format!(
                "{}:{}:{} invalid age '{}'",
                source,
                line_no,
                cols[1] + 1,
                fields[cols[1]]
            )
        })?;
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            bail!(
                "{}:{}:{} age {} out of range {}-{}",
                source,
                line_no,
                cols[1] + 1,
                age,
                MIN_AGE,
                MAX_AGE
            );
        }

        let mut values = [0.0f64; 5];
        for (i, value) in values.iter_mut().enumerate() {
            let col = cols[i + 2];
            *value = fields[col].parse().with_context(|| {
                format!(
                    "{}:{}:{} invalid {} '{}'",
                    source,
                    line_no,
                    col + 1,
                    PANEL_COLUMNS[i + 2],
                    fields[col]
                )
            })?;
        }

        let panel = MeasurementPanel::new(
            sex, age, values[0], values[1], values[2], values[3], values[4],
        )
        .with_context(|| format!("{}:{}", source, line_no))?;
        panels.push(panel);
    }

    if panels.is_empty() {
        bail!("{}: no panels found", source);
    }
    Ok(panels)
}
