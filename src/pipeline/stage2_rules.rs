use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::ctx::{Ctx, PanelSource};
use crate::error::ScreenError;
use crate::pipeline::Stage;
use crate::rules::evaluate;

pub struct Stage2Rules;

impl Stage2Rules {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Rules {
    fn name(&self) -> &'static str {
        "stage2_rules"
    }

    /// In a batch, a panel whose sex has no ranges is dropped with a warning.
    /// A single inline panel fails the run instead.
    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let table = ctx
            .reference
            .as_ref()
            .context("reference ranges not resolved")?;
        let batch = matches!(ctx.source, PanelSource::Csv(_));

        let mut kept = Vec::with_capacity(ctx.panels.len());
        let mut reports = Vec::with_capacity(ctx.panels.len());
        let mut skipped = Vec::new();
        for (i, panel) in ctx.panels.iter().enumerate() {
            match evaluate(panel, table) {
                Ok(report) => {
                    kept.push(panel.clone());
                    reports.push(report);
                }
                Err(err @ ScreenError::UnknownSex(_)) if batch => {
                    warn!(panel = i + 1, error = %err, "panel_skipped");
                    skipped.push(format!("panel {} skipped: {}", i + 1, err));
                }
                Err(err) => return Err(err).with_context(|| format!("panel {}", i + 1)),
            }
        }

        if kept.is_empty() {
            bail!("no panel could be screened ({} skipped)", skipped.len());
        }

        let flagged = reports.iter().filter(|r| !r.is_clean()).count();
        info!(
            panels = reports.len(),
            flagged,
            skipped = skipped.len(),
            "violations_ready"
        );
        ctx.panels = kept;
        ctx.violations = reports;
        ctx.warnings.extend(skipped);
        Ok(())
    }
}
