//! Gradient boosted trees for binary classification
//!
//! Boosts the log odds with regression trees fitted to the log-loss
//! gradient, with row and column subsampling per round.

use crate::error::{CoursecastError, Result};
use crate::training::decision_tree::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingConfig {
    /// Number of boosting rounds
    pub n_estimators: usize,
    /// Shrinkage applied to each round's contribution
    pub learning_rate: f64,
    /// Depth cap per stage tree
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Row subsample ratio per round
    pub subsample: f64,
    /// Column subsample ratio per round
    pub colsample: f64,
    pub random_state: u64,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            subsample: 0.8,
            colsample: 0.8,
            random_state: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    config: GradientBoostingConfig,
    trees: Vec<DecisionTree>,
    col_indices_per_tree: Vec<Vec<usize>>,
    initial_log_odds: f64,
}

impl Default for GradientBoostingClassifier {
    fn default() -> Self {
        Self::new(GradientBoostingConfig::default())
    }
}

impl GradientBoostingClassifier {
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            col_indices_per_tree: Vec::new(),
            initial_log_odds: 0.0,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(CoursecastError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(CoursecastError::TrainingError(
                "cannot fit on an empty matrix".to_string(),
            ));
        }

        let p = y.mean().unwrap_or(0.5);
        self.initial_log_odds = (p / (1.0 - p + 1e-10)).ln();

        let mut log_odds = Array1::from_elem(n_samples, self.initial_log_odds);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.random_state);

        for _ in 0..self.config.n_estimators {
            // gradient of the log loss
            let residuals: Array1<f64> = y
                .iter()
                .zip(log_odds.iter())
                .map(|(yi, &lo)| yi - sigmoid(lo))
                .collect();

            let sample_indices =
                subsample_indices(n_samples, self.config.subsample, &mut rng);
            let col_indices = subsample_indices(n_features, self.config.colsample, &mut rng);

            let x_sub = x
                .select(Axis(0), &sample_indices)
                .select(Axis(1), &col_indices);
            let y_sub: Array1<f64> =
                Array1::from_vec(sample_indices.iter().map(|&i| residuals[i]).collect());

            let mut tree = DecisionTree::new_regressor()
                .with_max_depth(self.config.max_depth)
                .with_min_samples_leaf(self.config.min_samples_leaf);
            tree.fit(&x_sub, &y_sub)?;

            let tree_pred = tree.predict(&x_sub)?;
            for (i, &idx) in sample_indices.iter().enumerate() {
                log_odds[idx] += self.config.learning_rate * tree_pred[i];
            }

            self.trees.push(tree);
            self.col_indices_per_tree.push(col_indices);
        }

        Ok(self)
    }

    /// Probability of class 1.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(CoursecastError::ModelNotFitted);
        }

        let n = x.nrows();
        let mut log_odds = Array1::from_elem(n, self.initial_log_odds);

        for (tree, col_indices) in self.trees.iter().zip(self.col_indices_per_tree.iter()) {
            let x_sub = x.select(Axis(1), col_indices);
            let tree_pred = tree.predict(&x_sub)?;
            for i in 0..n {
                log_odds[i] += self.config.learning_rate * tree_pred[i];
            }
        }

        Ok(log_odds.mapv(sigmoid))
    }

    /// 0/1 labels at the 0.5 threshold.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    pub fn n_rounds(&self) -> usize {
        self.trees.len()
    }
}

fn sigmoid(lo: f64) -> f64 {
    1.0 / (1.0 + (-lo).exp())
}

fn subsample_indices(n: usize, ratio: f64, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
    let sample_size = (((n as f64) * ratio).ceil() as usize).clamp(1, n);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(sample_size);
    indices.sort_unstable();
    indices
}
