use std::time::Instant;

use anyhow::{Result, bail};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

#[cfg(feature = "mt")]
use rayon::prelude::*;

use crate::classifier::dataset::Dataset;
use crate::classifier::forest::{DecisionTree, ForestModel, ModelMeta, Node};
use crate::panel::N_FEATURES;

const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub seed: u64,
    pub threads: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
            threads: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub model: ForestModel,
    pub train_rows: usize,
    pub test_rows: usize,
    pub accuracy: Option<f64>,
}

/// Seeded shuffle, then the first `ceil(n * test_fraction)` rows become the test set.
pub fn train_test_split(
    n: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&test_fraction) {
        bail!("test fraction must be in [0, 1), got {}", test_fraction);
    }
    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test >= n {
        bail!("no training rows left after holding out {} of {}", n_test, n);
    }
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);
    let test = order[..n_test].to_vec();
    let train = order[n_test..].to_vec();
    Ok((train, test))
}

pub fn train_forest(data: &Dataset, params: &ForestParams, test_fraction: f64) -> Result<TrainOutcome> {
    let (train_idx, test_idx) = train_test_split(data.len(), test_fraction, params.seed)?;
    let train = data.select(&train_idx);
    let test = data.select(&test_idx);
    info!(
        train_rows = train.len(),
        test_rows = test.len(),
        positives = train.positives(),
        "dataset_split"
    );

    let start = Instant::now();
    let trees = fit_forest(&train, params)?;
    info!(
        trees = trees.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "forest_fitted"
    );

    let meta = ModelMeta {
        algorithm: "random_forest".to_string(),
        n_trees: trees.len(),
        max_depth: params.max_depth,
        min_samples_split: params.min_samples_split,
        seed: params.seed,
        train_rows: train.len(),
        test_rows: test.len(),
        accuracy: None,
        trained_at: chrono::Utc::now().to_rfc3339(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let mut model = ForestModel::new(trees, meta);

    let accuracy = if test.is_empty() {
        None
    } else {
        Some(accuracy(&model, &test))
    };
    model.meta.accuracy = accuracy;

    Ok(TrainOutcome {
        model,
        train_rows: train.len(),
        test_rows: test.len(),
        accuracy,
    })
}

pub fn fit_forest(data: &Dataset, params: &ForestParams) -> Result<Vec<DecisionTree>> {
    if data.is_empty() {
        bail!("cannot fit a forest on an empty dataset");
    }
    if params.n_trees == 0 {
        bail!("n_trees must be at least 1");
    }
    if params.min_samples_split < 2 {
        bail!("min_samples_split must be at least 2");
    }

    #[cfg(feature = "mt")]
    {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if params.threads > 0 {
            builder = builder.num_threads(params.threads);
        }
        let pool = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build thread pool: {}", e))?;
        let trees = pool.install(|| {
            (0..params.n_trees)
                .into_par_iter()
                .map(|i| grow_tree(data, params, i))
                .collect::<Vec<_>>()
        });
        Ok(trees)
    }

    #[cfg(not(feature = "mt"))]
    {
        Ok((0..params.n_trees)
            .map(|i| grow_tree(data, params, i))
            .collect())
    }
}

pub fn accuracy(model: &ForestModel, data: &Dataset) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let correct = data
        .rows
        .iter()
        .zip(&data.labels)
        .filter(|(row, label)| {
            let predicted = u8::from(model.predict_proba(row) > 0.5);
            predicted == **label
        })
        .count();
    correct as f64 / data.len() as f64
}

fn tree_seed(seed: u64, tree_idx: usize) -> u64 {
    seed.wrapping_add((tree_idx as u64 + 1).wrapping_mul(SEED_STRIDE))
}

fn grow_tree(data: &Dataset, params: &ForestParams, tree_idx: usize) -> DecisionTree {
    let mut rng = StdRng::seed_from_u64(tree_seed(params.seed, tree_idx));
    let n = data.len();
    let bootstrap: Vec<usize> = (0..n).map(|_| rng.random_range(0..n)).collect();

    let mut builder = TreeBuilder {
        data,
        params,
        rng,
        nodes: Vec::new(),
    };
    builder.build(&bootstrap, 0);
    DecisionTree {
        nodes: builder.nodes,
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

struct TreeBuilder<'a> {
    data: &'a Dataset,
    params: &'a ForestParams,
    rng: StdRng,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    fn build(&mut self, indices: &[usize], depth: usize) -> usize {
        let data = self.data;
        let idx = self.nodes.len();
        let total = indices.len();
        let positives = indices.iter().filter(|&&i| data.labels[i] == 1).count();
        self.nodes.push(Node::Leaf {
            probability: positives as f64 / total as f64,
        });

        let pure = positives == 0 || positives == total;
        let depth_reached = self.params.max_depth.is_some_and(|d| depth >= d);
        if pure || depth_reached || total < self.params.min_samples_split {
            return idx;
        }
        let Some(split) = self.best_split(indices) else {
            return idx;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| data.rows[i][split.feature] <= split.threshold);
        let left_idx = self.build(&left, depth + 1);
        let right_idx = self.build(&right, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: left_idx,
            right: right_idx,
        };
        idx
    }

    /// Examines at least `sqrt(n_features)` randomly ordered features and
    /// keeps going past that only while no valid split has been found.
    fn best_split(&mut self, indices: &[usize]) -> Option<SplitCandidate> {
        let data = self.data;
        let mut features: Vec<usize> = (0..N_FEATURES).collect();
        features.shuffle(&mut self.rng);
        let max_features = ((N_FEATURES as f64).sqrt().floor() as usize).max(1);

        let total = indices.len();
        let total_pos = indices.iter().filter(|&&i| data.labels[i] == 1).count();
        let mut sorted = indices.to_vec();
        let mut best: Option<SplitCandidate> = None;

        for (visited, &feature) in features.iter().enumerate() {
            if visited >= max_features && best.is_some() {
                break;
            }
            sorted.sort_by(|&a, &b| data.rows[a][feature].total_cmp(&data.rows[b][feature]));

            let mut left_pos = 0usize;
            for i in 0..total - 1 {
                left_pos += data.labels[sorted[i]] as usize;
                let v = data.rows[sorted[i]][feature];
                let next = data.rows[sorted[i + 1]][feature];
                if v == next {
                    continue;
                }
                let n_left = i + 1;
                let n_right = total - n_left;
                let impurity = (n_left as f64 * gini(left_pos, n_left)
                    + n_right as f64 * gini(total_pos - left_pos, n_right))
                    / total as f64;
                if best.is_none_or(|b| impurity < b.impurity) {
                    let mut threshold = v + (next - v) / 2.0;
                    if threshold >= next {
                        threshold = v;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }
        best
    }
}

fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    2.0 * p * (1.0 - p)
}
