use anyhow::{Context, Result};
use std::fs;
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::panel::Sex;
use crate::pipeline::Stage;
use crate::reference::resolve_table;

pub struct Stage0Scaffold;

impl Stage0Scaffold {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage0Scaffold {
    fn name(&self) -> &'static str {
        "stage0_scaffold"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        if ctx.writes_any_output() {
            fs::create_dir_all(&ctx.output.out_dir).with_context(|| {
                format!("failed to create {}", ctx.output.out_dir.display())
            })?;
            info!(
                out_dir = %ctx.output.out_dir.display(),
                "output_dir_ready"
            );
        }

        if ctx.reference.is_none() {
            let table = resolve_table(ctx.ranges_path.as_deref(), ctx.ranges_mode)?;
            info!(
                version = %table.version,
                source = %table.source,
                "reference_ranges_ready"
            );
            for sex in Sex::ALL {
                if table.ranges_for(sex).is_err() {
                    warn!(sex = %sex, source = %table.source, "no_ranges_for_sex");
                    ctx.warnings.push(format!(
                        "reference ranges from {} define nothing for {}; those panels cannot be screened",
                        table.source, sex
                    ));
                }
            }
            ctx.reference = Some(table);
        }

        Ok(())
    }
}
