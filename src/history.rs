use crate::decision::{PredictionRecord, Verdict};

/// Records produced during this process, oldest first. Append-only and
/// unbounded; nothing is written to disk unless a writer is asked to.
#[derive(Debug, Clone, Default)]
pub struct History {
    records: Vec<PredictionRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends and returns the record's position.
    pub fn push(&mut self, record: PredictionRecord) -> usize {
        self.records.push(record);
        self.records.len() - 1
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &PredictionRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&PredictionRecord> {
        self.records.last()
    }

    pub fn count_verdict(&self, verdict: Verdict) -> usize {
        self.records.iter().filter(|r| r.verdict == verdict).count()
    }

    pub fn rule_overrides(&self) -> usize {
        self.records.iter().filter(|r| r.rule_override).count()
    }
}
