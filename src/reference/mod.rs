mod loader;

use std::path::Path;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::error::ScreenError;
use crate::panel::{Measurement, Sex};

pub use loader::{load_builtin_v1, load_ranges_tsv, parse_ranges_tsv};

/// Inclusive normal bounds for one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RangeBounds")]
pub struct ReferenceRange {
    low: f64,
    high: f64,
}

#[derive(Deserialize)]
struct RangeBounds {
    low: f64,
    high: f64,
}

impl TryFrom<RangeBounds> for ReferenceRange {
    type Error = ScreenError;

    fn try_from(bounds: RangeBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.low, bounds.high)
    }
}

impl ReferenceRange {
    pub fn new(low: f64, high: f64) -> Result<Self, ScreenError> {
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(ScreenError::InvalidRange { low, high });
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn is_violated(&self, value: f64) -> bool {
        value < self.low || value > self.high
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeEntry {
    pub sex: Sex,
    pub measurement: Measurement,
    pub range: ReferenceRange,
}

/// All five ranges for one sex, indexed by `Measurement::index`.
#[derive(Debug, Clone, PartialEq)]
pub struct SexRanges([ReferenceRange; 5]);

impl SexRanges {
    pub fn get(&self, measurement: Measurement) -> ReferenceRange {
        self.0[measurement.index()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    pub version: String,
    pub source: String,
    by_sex: [Option<SexRanges>; 2],
}

impl ReferenceTable {
    pub fn builtin() -> Result<Self> {
        let entries = load_builtin_v1()?;
        Self::from_entries("v1", "builtin", entries)
    }

    /// Builds a table from loose entries. A sex must be either complete or absent.
    pub fn from_entries(version: &str, source: &str, entries: Vec<RangeEntry>) -> Result<Self> {
        let mut slots: [[Option<ReferenceRange>; 5]; 2] = [[None; 5]; 2];
        for entry in entries {
            slots[entry.sex.index()][entry.measurement.index()] = Some(entry.range);
        }

        let mut by_sex: [Option<SexRanges>; 2] = [None, None];
        for sex in Sex::ALL {
            let row = &slots[sex.index()];
            let present = row.iter().filter(|r| r.is_some()).count();
            if present == 0 {
                continue;
            }
            if present != row.len() {
                let missing: Vec<&str> = Measurement::ALL
                    .iter()
                    .filter(|m| row[m.index()].is_none())
                    .map(|m| m.name())
                    .collect();
                bail!(
                    "{}: incomplete ranges for {} (missing {})",
                    source,
                    sex,
                    missing.join(", ")
                );
            }
            let mut ranges = [ReferenceRange { low: 0.0, high: 0.0 }; 5];
            for m in Measurement::ALL {
                if let Some(range) = row[m.index()] {
                    ranges[m.index()] = range;
                }
            }
            by_sex[sex.index()] = Some(SexRanges(ranges));
        }

        if by_sex.iter().all(|s| s.is_none()) {
            bail!("{}: no reference ranges defined", source);
        }

        Ok(Self {
            version: version.to_string(),
            source: source.to_string(),
            by_sex,
        })
    }

    pub fn ranges_for(&self, sex: Sex) -> Result<&SexRanges, ScreenError> {
        self.by_sex[sex.index()]
            .as_ref()
            .ok_or(ScreenError::UnknownSex(sex))
    }

    pub fn get(&self, sex: Sex, measurement: Measurement) -> Option<ReferenceRange> {
        self.by_sex[sex.index()]
            .as_ref()
            .map(|ranges| ranges.get(measurement))
    }

    pub fn entries(&self) -> Vec<RangeEntry> {
        let mut out = Vec::new();
        for sex in Sex::ALL {
            if let Some(ranges) = &self.by_sex[sex.index()] {
                for m in Measurement::ALL {
                    out.push(RangeEntry {
                        sex,
                        measurement: m,
                        range: ranges.get(m),
                    });
                }
            }
        }
        out
    }

    /// Overlays user entries onto this table, entry by entry.
    pub fn merge(self, overlay: Vec<RangeEntry>, overlay_source: &str) -> Result<Self> {
        if overlay.is_empty() {
            return Ok(self);
        }
        let mut entries = self.entries();
        entries.extend(overlay);
        let source = format!("{}+{}", self.source, overlay_source);
        Self::from_entries(&self.version, &source, entries)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangesMode {
    Overlay,
    Replace,
}

/// Resolves the table a run should use: built-in, optionally overlaid or replaced by a user TSV.
pub fn resolve_table(path: Option<&Path>, mode: RangesMode) -> Result<ReferenceTable> {
    let builtin = ReferenceTable::builtin()?;
    let Some(path) = path else {
        return Ok(builtin);
    };
    let user = load_ranges_tsv(path)?;
    let source = path.display().to_string();
    match mode {
        RangesMode::Overlay => builtin.merge(user, &source),
        RangesMode::Replace => ReferenceTable::from_entries("user", &source, user),
    }
}
