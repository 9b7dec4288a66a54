use anyhow::{Context, Result};
use tracing::info;

use crate::classifier::ForestModel;
use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage3Classify;

impl Stage3Classify {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Classify {
    fn name(&self) -> &'static str {
        "stage3_classify"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        if ctx.classifier.is_none() {
            let model = ForestModel::load(&ctx.model_path)?;
            info!(
                model = %ctx.model_path.display(),
                trees = model.trees.len(),
                "model_loaded"
            );
            ctx.classifier = Some(Box::new(model));
        }
        let classifier = ctx.classifier.as_deref().context("classifier missing")?;

        let mut labels = Vec::with_capacity(ctx.panels.len());
        for (i, panel) in ctx.panels.iter().enumerate() {
            let label = classifier
                .predict(&panel.features())
                .with_context(|| format!("panel {}", i + 1))?;
            labels.push(label);
        }

        info!(classifier = classifier.name(), panels = labels.len(), "labels_ready");
        ctx.labels = labels;
        Ok(())
    }
}
