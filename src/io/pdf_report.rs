use std::path::Path;

use anyhow::{Context, Result, bail};
use printpdf::{BuiltinFont, Mm, PdfDocument, PdfLayerReference};

use crate::decision::PredictionRecord;

pub const REPORT_TITLE: &str = "kira-leukoscreen - Patient Report";

// A4, positions in millimetres from the bottom-left corner.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TITLE_X: f32 = 53.0;
const TITLE_Y: f32 = 282.0;
const BODY_X: f32 = 25.0;
const BODY_TOP: f32 = 268.0;
const LINE_STEP: f32 = 7.0;

/// The `Key: Value` lines printed for one record, in report order.
pub fn report_lines(record: &PredictionRecord) -> Vec<String> {
    let p = &record.panel;
    vec![
        format!("Gender: {}", p.sex),
        format!("Age: {}", p.age),
        format!("WBC: {}", p.wbc),
        format!("RBC: {}", p.rbc),
        format!("Platelets: {}", p.platelets),
        format!("Hemoglobin: {}", p.hemoglobin),
        format!("Blasts: {}", p.blasts),
        format!("Violations: {}", record.violation_count),
        format!("Prediction: {}", record.verdict),
        format!("Timestamp: {}", record.timestamp),
    ]
}

/// One page per record.
pub fn render_pdf(records: &[PredictionRecord]) -> Result<Vec<u8>> {
    if records.is_empty() {
        bail!("no records to render");
    }
    let (doc, first_page, first_layer) =
        PdfDocument::new(REPORT_TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow::anyhow!("PDF font error: {}", e))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow::anyhow!("PDF font error: {}", e))?;

    for (i, record) in records.iter().enumerate() {
        let layer: PdfLayerReference = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };

        layer.use_text(REPORT_TITLE, 16.0, Mm(TITLE_X), Mm(TITLE_Y), &bold);
        let mut y = BODY_TOP;
        for line in report_lines(record) {
            layer.use_text(line, 12.0, Mm(BODY_X), Mm(y), &regular);
            y -= LINE_STEP;
        }
    }

    doc.save_to_bytes()
        .map_err(|e| anyhow::anyhow!("failed to serialize PDF: {}", e))
}

pub fn write_pdf(path: &Path, records: &[PredictionRecord]) -> Result<()> {
    let bytes = render_pdf(records)?;
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
