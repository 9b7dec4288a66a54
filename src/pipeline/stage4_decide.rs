use anyhow::{Result, bail};
use tracing::info;

use crate::ctx::Ctx;
use crate::decision::decide;
use crate::pipeline::Stage;

pub struct Stage4Decide;

impl Stage4Decide {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Decide {
    fn name(&self) -> &'static str {
        "stage4_decide"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let n = ctx.panels.len();
        if ctx.violations.len() != n || ctx.labels.len() != n {
            bail!(
                "stage inputs out of step: {} panels, {} violation reports, {} labels",
                n,
                ctx.violations.len(),
                ctx.labels.len()
            );
        }

        for ((panel, report), label) in ctx.panels.iter().zip(&ctx.violations).zip(&ctx.labels) {
            let record = decide(panel, report, *label);
            info!(
                verdict = %record.verdict,
                violations = record.violation_count,
                rule_override = record.rule_override,
                "prediction_recorded"
            );
            ctx.history.push(record);
        }
        Ok(())
    }
}
