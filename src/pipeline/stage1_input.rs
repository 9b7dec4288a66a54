use anyhow::Result;
use tracing::info;

use crate::ctx::{Ctx, PanelSource};
use crate::io::panels;
use crate::pipeline::Stage;

pub struct Stage1Input;

impl Stage1Input {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Input {
    fn name(&self) -> &'static str {
        "stage1_input"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let loaded = match &ctx.source {
            PanelSource::Inline(panel) => vec![panel.clone()],
            PanelSource::Csv(path) => {
                info!(input = %path.display(), "reading panels");
                panels::read_panels(path)?
            }
        };
        info!(panels = loaded.len(), "panels_ready");
        ctx.panels = loaded;
        Ok(())
    }
}
