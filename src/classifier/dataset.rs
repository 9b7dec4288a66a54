use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::io::{column_index, split_csv_line};
use crate::panel::N_FEATURES;

/// Dataset columns mapped onto `FEATURE_NAMES`, in the same order.
pub const DATASET_COLUMNS: [&str; N_FEATURES] = [
    "Age",
    "WBC_Count",
    "RBC_Count",
    "Platelet_Count",
    "Hemoglobin_Level",
    "Bone_Marrow_Blasts",
];
pub const TARGET_COLUMN: &str = "Leukemia_Status";

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub rows: Vec<[f64; N_FEATURES]>,
    pub labels: Vec<u8>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }

    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            rows: indices.iter().map(|&i| self.rows[i]).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }
}

pub fn read_dataset_csv(path: &Path) -> Result<Dataset> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    parse_dataset_csv(&content, &path.display().to_string())
}

pub fn parse_dataset_csv(content: &str, source: &str) -> Result<Dataset> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty() && !l.trim_start().starts_with('#'));

    let (_, header_line) = lines
        .next()
        .ok_or_else(|| anyhow::anyhow!("{}: dataset is empty", source))?;
    let header = split_csv_line(header_line);

    let mut feature_cols = [0usize; N_FEATURES];
    for (slot, name) in feature_cols.iter_mut().zip(DATASET_COLUMNS) {
        *slot = column_index(&header, name, source)?;
    }
    let target_col = column_index(&header, TARGET_COLUMN, source)?;

    let mut dataset = Dataset::default();
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

        let mut row = [0.0f64; N_FEATURES];
        for (i, &col) in feature_cols.iter().enumerate() {
            let raw = &fields[col];
            let v: f64 = raw.parse().with_context(|| {
                format!(
                    "{}:{}:{} invalid number '{}' in {}",
                    source,
                    line_no,
                    col + 1,
                    raw,
                    DATASET_COLUMNS[i]
                )
            })?;
            if !v.is_finite() {
                bail!("{}:{}:{} non-finite value", source, line_no, col + 1);
            }
            row[i] = v;
        }

        let label = match fields[target_col].as_str() {
            "Positive" => 1u8,
            "Negative" => 0u8,
            other => bail!(
                "{}:{}:{} unknown {} '{}' (expected Positive or Negative)",
                source,
                line_no,
                target_col + 1,
                TARGET_COLUMN,
                other
            ),
        };

        dataset.rows.push(row);
        dataset.labels.push(label);
    }

    if dataset.is_empty() {
        bail!("{}: dataset has a header but no rows", source);
    }
    Ok(dataset)
}
