use std::collections::HashSet;
use std::fs;

use tempfile::TempDir;

use kira_leukoscreen::ScreenError;
use kira_leukoscreen::classifier::dataset::Dataset;
use kira_leukoscreen::classifier::train::{ForestParams, fit_forest, train_forest, train_test_split};
use kira_leukoscreen::classifier::{Classifier, DecisionTree, ForestModel, Label, ModelMeta, Node};
use kira_leukoscreen::panel::FeatureVector;

/// Only blasts vary; negatives sit in 0..=4, positives in 60..=70.
fn separable(n: usize) -> Dataset {
    let mut data = Dataset::default();
    for i in 0..n {
        let label = (i % 2) as u8;
        let blasts = if label == 1 {
            60.0 + (i % 11) as f64
        } else {
            (i % 5) as f64
        };
        data.rows.push([40.0, 7000.0, 5.0, 250000.0, 14.0, blasts]);
        data.labels.push(label);
    }
    data
}

fn params(n_trees: usize, seed: u64) -> ForestParams {
    ForestParams {
        n_trees,
        seed,
        threads: 2,
        ..ForestParams::default()
    }
}

fn meta() -> ModelMeta {
    ModelMeta {
        algorithm: "random_forest".to_string(),
        n_trees: 1,
        max_depth: None,
        min_samples_split: 2,
        seed: 0,
        train_rows: 0,
        test_rows: 0,
        accuracy: None,
        trained_at: "2024-01-01T00:00:00Z".to_string(),
        tool_version: "test".to_string(),
    }
}

fn features(blasts: f64) -> FeatureVector {
    FeatureVector([40.0, 7000.0, 5.0, 250000.0, 14.0, blasts])
}

#[test]
fn split_sizes_and_disjointness() {
    let (train, test) = train_test_split(10, 0.2, 42).unwrap();
    assert_eq!(train.len(), 8);
    assert_eq!(test.len(), 2);

    let all: HashSet<usize> = train.iter().chain(&test).copied().collect();
    assert_eq!(all.len(), 10);

    let (train, test) = train_test_split(7, 0.2, 1).unwrap();
    assert_eq!(test.len(), 2);
    assert_eq!(train.len(), 5);

    assert_eq!(train_test_split(10, 0.2, 42).unwrap(), train_test_split(10, 0.2, 42).unwrap());
}

#[test]
fn split_rejects_bad_fractions() {
    assert!(train_test_split(10, 1.0, 0).is_err());
    assert!(train_test_split(10, -0.1, 0).is_err());
    assert!(train_test_split(1, 0.5, 0).is_err());
    let (train, test) = train_test_split(5, 0.0, 0).unwrap();
    assert_eq!(train.len(), 5);
    assert!(test.is_empty());
}

#[test]
fn separable_data_is_learned() {
    let outcome = train_forest(&separable(200), &params(15, 7), 0.25).unwrap();
    assert_eq!(outcome.test_rows, 50);
    assert_eq!(outcome.train_rows, 150);
    assert_eq!(outcome.accuracy, Some(1.0));
    assert_eq!(outcome.model.meta.accuracy, Some(1.0));
    assert_eq!(outcome.model.trees.len(), 15);

    let model = &outcome.model;
    assert_eq!(model.predict(&features(65.0)).unwrap(), Label::Positive);
    assert_eq!(model.predict(&features(2.0)).unwrap(), Label::Negative);
}

#[test]
fn same_seed_same_trees() {
    let data = separable(120);
    let a = fit_forest(&data, &params(8, 99)).unwrap();
    let b = fit_forest(&data, &params(8, 99)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn max_depth_is_respected() {
    let mut data = separable(100);
    // Noisy second feature so unbounded trees would grow deeper.
    for (i, row) in data.rows.iter_mut().enumerate() {
        row[1] = (i * 37 % 101) as f64;
    }
    let p = ForestParams {
        max_depth: Some(1),
        ..params(10, 3)
    };
    for tree in fit_forest(&data, &p).unwrap() {
        assert!(tree.depth() <= 1);
    }
}

#[test]
fn fit_rejects_bad_params() {
    let data = separable(20);
    assert!(fit_forest(&data, &params(0, 1)).is_err());
    let p = ForestParams {
        min_samples_split: 1,
        ..params(3, 1)
    };
    assert!(fit_forest(&data, &p).is_err());
    assert!(fit_forest(&Dataset::default(), &params(3, 1)).is_err());
}

#[test]
fn save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("models").join("forest.json");
    let outcome = train_forest(&separable(80), &params(5, 11), 0.2).unwrap();
    outcome.model.save(&path).unwrap();

    let loaded = ForestModel::load(&path).unwrap();
    assert_eq!(loaded, outcome.model);
    assert_eq!(loaded.predict(&features(70.0)).unwrap(), Label::Positive);
    assert_eq!(loaded.name(), "random_forest");
}

#[test]
fn missing_model_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let err = ForestModel::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ScreenError::ClassifierUnavailable(_)));
}

#[test]
fn malformed_model_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"format\": \"kira-leukoscreen-forest\"").unwrap();
    let err = ForestModel::load(&path).unwrap_err();
    assert!(matches!(err, ScreenError::ClassifierUnavailable(_)));
}

#[test]
fn structurally_invalid_model_is_unavailable() {
    let cyclic = ForestModel::new(
        vec![DecisionTree {
            nodes: vec![Node::Split {
                feature: 5,
                threshold: 10.0,
                left: 0,
                right: 0,
            }],
        }],
        meta(),
    );
    let json = serde_json::to_string(&cyclic).unwrap();
    let err = ForestModel::from_json(&json).unwrap_err();
    assert!(err.to_string().contains("invalid children"));

    let mut reordered = ForestModel::new(
        vec![DecisionTree {
            nodes: vec![Node::Leaf { probability: 1.0 }],
        }],
        meta(),
    );
    reordered.features.swap(0, 1);
    let json = serde_json::to_string(&reordered).unwrap();
    assert!(matches!(
        ForestModel::from_json(&json),
        Err(ScreenError::ClassifierUnavailable(_))
    ));
}

#[test]
fn hand_built_tree_predicts_by_threshold() {
    let model = ForestModel::new(
        vec![DecisionTree {
            nodes: vec![
                Node::Split {
                    feature: 5,
                    threshold: 20.0,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { probability: 0.0 },
                Node::Leaf { probability: 1.0 },
            ],
        }],
        meta(),
    );
    assert_eq!(model.predict(&features(20.0)).unwrap(), Label::Negative);
    assert_eq!(model.predict(&features(20.5)).unwrap(), Label::Positive);
    assert_eq!(model.trees[0].predict_proba(&features(25.0).0), 1.0);
    assert_eq!(model.predict_proba(&features(3.0).0), 0.0);
    assert!(matches!(
        model.predict(&features(f64::NAN)),
        Err(ScreenError::ClassifierUnavailable(_))
    ));
}

#[test]
fn tied_vote_is_negative() {
    let model = ForestModel::new(
        vec![
            DecisionTree {
                nodes: vec![Node::Leaf { probability: 1.0 }],
            },
            DecisionTree {
                nodes: vec![Node::Leaf { probability: 0.0 }],
            },
        ],
        meta(),
    );
    assert_eq!(model.predict_proba(&features(1.0).0), 0.5);
    assert_eq!(model.predict(&features(1.0)).unwrap(), Label::Negative);
}
