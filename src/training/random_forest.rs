//! Random forest classifier

use crate::error::{CoursecastError, Result};
use crate::training::decision_tree::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-tree feature budget.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Square root of the feature count
    Sqrt,
    /// Fixed number
    Fixed(usize),
    /// All features
    All,
}

/// Bagged ensemble of gini CART trees with majority voting.
///
/// Each tree trains on a bootstrap row sample and a random feature subset,
/// both drawn from a per-tree `ChaCha8Rng` seeded off `random_state`, so a
/// fit is fully reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    trees: Vec<DecisionTree>,
    feature_indices_per_tree: Vec<Vec<usize>>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub random_state: u64,
}

impl Default for RandomForestClassifier {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForestClassifier {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            feature_indices_per_tree: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            random_state: 42,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    fn compute_max_features(&self, n_features: usize) -> usize {
        match self.max_features {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Fixed(n) => n.min(n_features),
            MaxFeatures::All => n_features,
        }
        .max(1)
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
                "cannot fit a forest on zero samples".to_string(),
            ));
        }

        let max_features = self.compute_max_features(n_features);
        let base_seed = self.random_state;

        let fitted: Vec<(DecisionTree, Vec<usize>)> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));

                let sample_indices: Vec<usize> = (0..n_samples)
                    .map(|_| (rng.next_u64() as usize) % n_samples)
                    .collect();

                let mut feature_indices: Vec<usize> = (0..n_features).collect();
                feature_indices.shuffle(&mut rng);
                feature_indices.truncate(max_features);
                feature_indices.sort_unstable();

                let x_boot = x
                    .select(Axis(0), &sample_indices)
                    .select(Axis(1), &feature_indices);
                let y_boot: Array1<f64> =
                    Array1::from_vec(sample_indices.iter().map(|&i| y[i]).collect());

                let mut tree = DecisionTree::new_classifier()
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf);
                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }
                tree.fit(&x_boot, &y_boot).ok();

                (tree, feature_indices)
            })
            .collect();

        let (trees, feature_indices): (Vec<_>, Vec<_>) = fitted.into_iter().unzip();
        self.trees = trees;
        self.feature_indices_per_tree = feature_indices;
        Ok(self)
    }

    fn tree_votes(&self, x: &Array2<f64>) -> Result<Vec<Array1<f64>>> {
        if self.trees.is_empty() {
            return Err(CoursecastError::ModelNotFitted);
        }

        let votes: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .zip(self.feature_indices_per_tree.par_iter())
            .filter_map(|(tree, cols)| {
                let x_sub = x.select(Axis(1), cols);
                tree.predict(&x_sub).ok()
            })
            .collect();

        if votes.is_empty() {
            return Err(CoursecastError::TrainingError(
                "no tree could make predictions".to_string(),
            ));
        }
        Ok(votes)
    }

    /// Majority vote across trees; the lower class wins ties.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let all_votes = self.tree_votes(x)?;
        let n_samples = x.nrows();

        let predictions: Vec<f64> = (0..n_samples)
            .map(|i| {
                let mut votes: HashMap<i64, usize> = HashMap::new();
                for preds in &all_votes {
                    *votes.entry(preds[i].round() as i64).or_insert(0) += 1;
                }
                votes
                    .into_iter()
                    .max_by(|(ca, na), (cb, nb)| na.cmp(nb).then_with(|| cb.cmp(ca)))
                    .map(|(class, _)| class as f64)
                    .unwrap_or(0.0)
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Probability of class 1, as the fraction of trees voting for it.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let all_votes = self.tree_votes(x)?;
        let n_trees = all_votes.len() as f64;

        let proba: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let positive = all_votes.iter().filter(|p| p[i] >= 0.5).count();
                positive as f64 / n_trees
            })
            .collect();

        Ok(Array1::from_vec(proba))
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classifier_separable() {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.1],
            [0.2, 0.2],
            [1.0, 1.0],
            [1.1, 1.1],
            [1.2, 1.2],
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut rf = RandomForestClassifier::new(10).with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let predictions = rf.predict(&x).unwrap();
        let accuracy = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| (*p - *a).abs() < 0.5)
            .count() as f64
            / y.len() as f64;

        assert!(accuracy >= 0.8, "accuracy too low: {}", accuracy);
    }

    #[test]
    fn test_fit_is_reproducible() {
        let x = array![[0.0, 1.0], [1.0, 0.0], [2.0, 3.0], [3.0, 2.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut a = RandomForestClassifier::new(5).with_random_state(7);
        let mut b = RandomForestClassifier::new(5).with_random_state(7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_proba_bounds() {
        let x = array![[0.0], [1.0], [5.0], [6.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut rf = RandomForestClassifier::new(10).with_random_state(42);
        rf.fit(&x, &y).unwrap();

        let proba = rf.predict_proba(&x).unwrap();
        for p in proba.iter() {
            assert!((0.0..=1.0).contains(p));
        }
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let rf = RandomForestClassifier::new(5);
        assert!(matches!(
            rf.predict(&array![[1.0]]),
            Err(CoursecastError::ModelNotFitted)
        ));
    }
}
