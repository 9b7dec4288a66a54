use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use kira_leukoscreen::ScreenError;
use kira_leukoscreen::classifier::{FixedClassifier, Label};
use kira_leukoscreen::ctx::{Ctx, PanelSource};
use kira_leukoscreen::decision::Verdict;
use kira_leukoscreen::panel::{MeasurementPanel, Sex};
use kira_leukoscreen::pipeline::Pipeline;
use kira_leukoscreen::reference::RangesMode;

const PANELS: &str = "Gender,Age,WBC,RBC,Platelets,Hemoglobin,Blasts
Male,52,2698,5.36,262493,12.2,72
Female,30,6000,4.8,300000,13.5,2
Male,45,7500,5.4,300000,15.5,2.5
";

fn write_panels(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("panels.csv");
    fs::write(&path, PANELS).unwrap();
    path
}

fn write_male_only_ranges(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("male_only.tsv");
    fs::write(
        &path,
        "Male\tWBC\t4000\t11000\nMale\tRBC\t4.7\t6.1\nMale\tPlatelets\t150000\t450000\n\
         Male\tHemoglobin\t13.8\t17.2\nMale\tBlasts\t0\t5\n",
    )
    .unwrap();
    path
}

fn male_only_ctx(dir: &TempDir, source: PanelSource) -> Ctx {
    let mut ctx = Ctx::new(
        source,
        dir.path().join("out"),
        dir.path().join("unused.json"),
        false,
        false,
        false,
        "0.0.0-test",
    );
    ctx.ranges_path = Some(write_male_only_ranges(dir));
    ctx.ranges_mode = RangesMode::Replace;
    ctx.classifier = Some(Box::new(FixedClassifier(Label::Negative)));
    ctx
}

#[test]
fn batch_run_writes_all_outputs() {
    let dir = TempDir::new().unwrap();
    let input = write_panels(&dir);
    let out = dir.path().join("out");

    let mut ctx = Ctx::new(
        PanelSource::Csv(input),
        out.clone(),
        dir.path().join("unused.json"),
        true,
        true,
        true,
        "0.0.0-test",
    );
    ctx.classifier = Some(Box::new(FixedClassifier(Label::Negative)));

    Pipeline::screening().run(&mut ctx).unwrap();

    assert_eq!(ctx.panels.len(), 3);
    assert_eq!(ctx.history.len(), 3);
    let verdicts: Vec<Verdict> = ctx.history.iter().map(|r| r.verdict).collect();
    assert_eq!(verdicts, vec![Verdict::Positive, Verdict::Negative, Verdict::Negative]);
    assert_eq!(ctx.history.rule_overrides(), 1);
    assert_eq!(ctx.report.records.len(), 3);

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("leukoscreen.json")).unwrap()).unwrap();
    assert_eq!(written["records"].as_array().unwrap().len(), 3);
    assert_eq!(written["summary"], serde_json::to_value(&ctx.report.summary).unwrap());
    for (i, record) in ctx.report.records.iter().enumerate() {
        assert_eq!(written["records"][i]["timestamp"], record.timestamp.as_str());
    }
    assert!(out.join("patient_report.pdf").exists());
    let tsv = fs::read_to_string(out.join("history.tsv")).unwrap();
    assert_eq!(tsv.lines().count(), 4);
}

#[test]
fn inline_run_without_outputs_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("never");
    let panel = MeasurementPanel::new(Sex::Female, 30, 6000.0, 4.8, 300000.0, 13.5, 2.0).unwrap();

    let mut ctx = Ctx::new(
        PanelSource::Inline(panel),
        out.clone(),
        dir.path().join("unused.json"),
        false,
        false,
        false,
        "0.0.0-test",
    );
    ctx.classifier = Some(Box::new(FixedClassifier(Label::Positive)));

    Pipeline::screening().run(&mut ctx).unwrap();
    assert_eq!(ctx.history.len(), 1);
    assert_eq!(ctx.history.records()[0].verdict, Verdict::Positive);
    assert!(!out.exists());
}

#[test]
fn missing_model_fails_without_partial_history() {
    let dir = TempDir::new().unwrap();
    let input = write_panels(&dir);

    let mut ctx = Ctx::new(
        PanelSource::Csv(input),
        dir.path().join("out"),
        dir.path().join("no_model.json"),
        false,
        false,
        false,
        "0.0.0-test",
    );

    let err = Pipeline::screening().run(&mut ctx).unwrap_err();
    let root = err.root_cause().downcast_ref::<ScreenError>();
    assert!(matches!(root, Some(ScreenError::ClassifierUnavailable(_))));
    assert!(ctx.history.is_empty());
}

#[test]
fn batch_skips_panels_without_ranges_and_warns() {
    let dir = TempDir::new().unwrap();
    let input = write_panels(&dir);
    let mut ctx = male_only_ctx(&dir, PanelSource::Csv(input));

    Pipeline::screening().run(&mut ctx).unwrap();

    assert_eq!(ctx.history.len(), 2);
    assert!(ctx.history.iter().all(|r| r.panel.sex == Sex::Male));
    assert_eq!(ctx.warnings.len(), 2);
    assert!(ctx.warnings[0].contains("define nothing for Female"));
    assert!(ctx.warnings[1].starts_with("panel 2 skipped"));
    assert_eq!(ctx.report.summary.total, 2);
}

#[test]
fn inline_panel_without_ranges_fails() {
    let dir = TempDir::new().unwrap();
    let panel = MeasurementPanel::new(Sex::Female, 30, 6000.0, 4.8, 300000.0, 13.5, 2.0).unwrap();
    let mut ctx = male_only_ctx(&dir, PanelSource::Inline(panel));

    let err = Pipeline::screening().run(&mut ctx).unwrap_err();
    let root = err.root_cause().downcast_ref::<ScreenError>();
    assert!(matches!(root, Some(ScreenError::UnknownSex(Sex::Female))));
    assert!(format!("{:#}", err).contains("panel 1"));
    assert!(ctx.history.is_empty());
}

#[test]
fn batch_with_no_screenable_panel_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("women.csv");
    fs::write(
        &input,
        "Gender,Age,WBC,RBC,Platelets,Hemoglobin,Blasts\nFemale,30,6000,4.8,300000,13.5,2\n",
    )
    .unwrap();
    let mut ctx = male_only_ctx(&dir, PanelSource::Csv(input));

    let err = Pipeline::screening().run(&mut ctx).unwrap_err();
    assert!(err.to_string().contains("no panel could be screened"));
    assert!(ctx.history.is_empty());
}

#[test]
fn builtin_ranges_add_no_warnings() {
    let dir = TempDir::new().unwrap();
    let input = write_panels(&dir);
    let mut ctx = Ctx::new(
        PanelSource::Csv(input),
        dir.path().join("out"),
        dir.path().join("unused.json"),
        false,
        false,
        false,
        "0.0.0-test",
    );
    ctx.classifier = Some(Box::new(FixedClassifier(Label::Positive)));

    Pipeline::screening().run(&mut ctx).unwrap();
    assert!(ctx.warnings.is_empty());
}
