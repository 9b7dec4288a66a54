use std::path::PathBuf;

use crate::classifier::{Classifier, Label};
use crate::history::History;
use crate::panel::MeasurementPanel;
use crate::reference::{RangesMode, ReferenceTable};
use crate::rules::ViolationReport;
use crate::schema::v1::LeukoScreenV1;

#[derive(Debug, Clone)]
pub enum PanelSource {
    Inline(MeasurementPanel),
    Csv(PathBuf),
}

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub json_path: PathBuf,
    pub pdf_path: PathBuf,
    pub tsv_path: PathBuf,
}

/// Run state threaded through the pipeline stages. The history lives here,
/// owned by the caller, and only `stage4_decide` appends to it.
#[derive(Debug)]
pub struct Ctx {
    pub source: PanelSource,
    pub model_path: PathBuf,
    pub ranges_path: Option<PathBuf>,
    pub ranges_mode: RangesMode,
    pub write_json: bool,
    pub write_pdf: bool,
    pub write_tsv: bool,
    pub reference: Option<ReferenceTable>,
    pub classifier: Option<Box<dyn Classifier>>,
    pub panels: Vec<MeasurementPanel>,
    pub violations: Vec<ViolationReport>,
    pub labels: Vec<Label>,
    pub history: History,
    pub warnings: Vec<String>,
    pub output: OutputPaths,
    pub report: LeukoScreenV1,
}

impl Ctx {
    pub fn new(
        source: PanelSource,
        out_dir: PathBuf,
        model_path: PathBuf,
        write_json: bool,
        write_pdf: bool,
        write_tsv: bool,
        tool_version: &str,
    ) -> Self {
        let json_path = out_dir.join("leukoscreen.json");
        let pdf_path = out_dir.join("patient_report.pdf");
        let tsv_path = out_dir.join("history.tsv");
        Self {
            source,
            model_path,
            ranges_path: None,
            ranges_mode: RangesMode::Overlay,
            write_json,
            write_pdf,
            write_tsv,
            reference: None,
            classifier: None,
            panels: Vec::new(),
            violations: Vec::new(),
            labels: Vec::new(),
            history: History::new(),
            warnings: Vec::new(),
            output: OutputPaths {
                out_dir,
                json_path,
                pdf_path,
                tsv_path,
            },
            report: LeukoScreenV1::empty(tool_version),
        }
    }

    pub fn writes_any_output(&self) -> bool {
        self.write_json || self.write_pdf || self.write_tsv
    }
}
