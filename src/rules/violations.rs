use std::collections::BTreeMap;

use crate::error::ScreenError;
use crate::panel::{Measurement, MeasurementPanel};
use crate::reference::ReferenceTable;
use crate::rules::ViolationReport;

/// Checks the five measurements against the panel's sex-specific ranges.
/// Bounds are inclusive; age is never checked.
pub fn evaluate(
    panel: &MeasurementPanel,
    table: &ReferenceTable,
) -> Result<ViolationReport, ScreenError> {
    let ranges = table.ranges_for(panel.sex)?;

    let mut per_field = BTreeMap::new();
    let mut count = 0usize;
    for m in Measurement::ALL {
        let violated = ranges.get(m).is_violated(panel.value(m));
        if violated {
            count += 1;
        }
        per_field.insert(m, violated);
    }

    Ok(ViolationReport { count, per_field })
}
