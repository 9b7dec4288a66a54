use std::fs;

use tempfile::TempDir;

use kira_leukoscreen::ScreenError;
use kira_leukoscreen::io::panels::{parse_panels_csv, read_panels};
use kira_leukoscreen::panel::{FEATURE_NAMES, Measurement, MeasurementPanel, Sex};

#[test]
fn panel_rejects_non_finite_values() {
    let err = MeasurementPanel::new(Sex::Male, 40, f64::NAN, 5.0, 200000.0, 15.0, 1.0).unwrap_err();
    assert!(matches!(err, ScreenError::InvalidPanel(_)));

    let err =
        MeasurementPanel::new(Sex::Male, 40, 6000.0, 5.0, f64::INFINITY, 15.0, 1.0).unwrap_err();
    assert!(err.to_string().contains("Platelets"));
}

#[test]
fn features_follow_model_column_order() {
    assert_eq!(FEATURE_NAMES, ["Age", "WBC", "RBC", "Platelets", "Hemoglobin", "Blasts"]);
    let p = MeasurementPanel::new(Sex::Female, 30, 6000.0, 4.8, 300000.0, 13.5, 2.0).unwrap();
    assert_eq!(p.features().0, [30.0, 6000.0, 4.8, 300000.0, 13.5, 2.0]);
    assert_eq!(p.value(Measurement::Hemoglobin), 13.5);
}

#[test]
fn sex_and_measurement_parse_loosely() {
    assert_eq!("male".parse::<Sex>().unwrap(), Sex::Male);
    assert_eq!(" F ".parse::<Sex>().unwrap(), Sex::Female);
    assert!("other".parse::<Sex>().is_err());

    assert_eq!("wbc".parse::<Measurement>().unwrap(), Measurement::Wbc);
    assert_eq!("Platelets".parse::<Measurement>().unwrap(), Measurement::Platelets);
    assert!("Age".parse::<Measurement>().is_err());
}

#[test]
fn parses_columns_in_any_order() {
    let content = "\
# morning batch
Age,gender,Blasts,WBC,RBC,Platelets,Hemoglobin,Patient
52,Male,72,2698,5.36,262493,12.2,\"Doe, J\"

30,Female,2,6000,4.8,300000,13.5,P2
";
    let panels = parse_panels_csv(content, "mem").unwrap();
    assert_eq!(panels.len(), 2);
    assert_eq!(
        panels[0],
        MeasurementPanel::new(Sex::Male, 52, 2698.0, 5.36, 262493.0, 12.2, 72.0).unwrap()
    );
    assert_eq!(panels[1].sex, Sex::Female);
    assert_eq!(panels[1].blasts, 2.0);
}

#[test]
fn missing_column_is_reported() {
    let err = parse_panels_csv("Gender,Age,WBC,RBC,Platelets,Hemoglobin\nMale,1,1,1,1,1\n", "mem")
        .unwrap_err();
    assert!(err.to_string().contains("missing column 'Blasts'"));
}

#[test]
fn bad_cell_is_reported_with_position() {
    let content = "Gender,Age,WBC,RBC,Platelets,Hemoglobin,Blasts\n\
                   Male,52,2698,5.36,262493,12.2,72\n\
                   Male,52,lots,5.36,262493,12.2,72\n";
    let err = parse_panels_csv(content, "batch.csv").unwrap_err();
    assert!(err.to_string().contains("batch.csv:3:3"));

    let content = "Gender,Age,WBC,RBC,Platelets,Hemoglobin,Blasts\nX,52,1,1,1,1,1\n";
    let err = parse_panels_csv(content, "batch.csv").unwrap_err();
    assert!(err.to_string().contains("batch.csv:2:1"));
}

#[test]
fn age_outside_accepted_range_is_rejected() {
    for age in ["0", "121"] {
        let content = format!(
            "Gender,Age,WBC,RBC,Platelets,Hemoglobin,Blasts\nFemale,{},6000,4.8,300000,13.5,2\n",
            age
        );
        let err = parse_panels_csv(&content, "batch.csv").unwrap_err();
        assert!(err.to_string().contains("batch.csv:2:2 age"), "{}", err);
    }

    let content = "Gender,Age,WBC,RBC,Platelets,Hemoglobin,Blasts\n\
                   Female,1,6000,4.8,300000,13.5,2\n\
                   Male,120,6000,5.0,300000,15.0,2\n";
    assert_eq!(parse_panels_csv(content, "batch.csv").unwrap().len(), 2);
}

#[test]
fn ragged_row_is_rejected() {
    let content = "Gender,Age,WBC,RBC,Platelets,Hemoglobin,Blasts\nMale,52,2698,5.36\n";
    assert!(parse_panels_csv(content, "mem").is_err());
}

#[test]
fn header_only_is_rejected() {
    let err = parse_panels_csv("Gender,Age,WBC,RBC,Platelets,Hemoglobin,Blasts\n", "mem")
        .unwrap_err();
    assert!(err.to_string().contains("no panels"));
}

#[test]
fn reads_panels_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("panels.csv");
    fs::write(
        &path,
        "Gender,Age,WBC,RBC,Platelets,Hemoglobin,Blasts\r\nFemale,44,5200,4.5,210000,12.9,1\r\n",
    )
    .unwrap();
    let panels = read_panels(&path).unwrap();
    assert_eq!(panels.len(), 1);
    assert_eq!(panels[0].age, 44);
    assert_eq!(panels[0].blasts, 1.0);
}
