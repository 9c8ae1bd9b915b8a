//! CART decision tree, the shared base learner
//!
//! Grown greedily with midpoint thresholds. Classification trees split on
//! gini impurity and predict the majority class; regression trees (used as
//! boosting stages) split on variance and predict the leaf mean.

use crate::error::{CoursecastError, Result};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Criterion {
    /// Gini impurity (classification)
    Gini,
    /// Variance (regression)
    Mse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub criterion: Criterion,
    is_classification: bool,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new_classifier()
    }
}

impl DecisionTree {
    pub fn new_classifier() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: Criterion::Gini,
            is_classification: true,
        }
    }

    pub fn new_regressor() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: Criterion::Mse,
            is_classification: false,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(CoursecastError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(CoursecastError::TrainingError(
                "cannot fit a tree on zero samples".to_string(),
            ));
        }

        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, y, &indices, 0));
        Ok(self)
    }

    fn build_tree(&self, x: &Array2<f64>, y: &Array1<f64>, indices: &[usize], depth: usize) -> TreeNode {
        let n_samples = indices.len();
        let y_subset: Vec<f64> = indices.iter().map(|&i| y[i]).collect();

        let should_stop = n_samples < self.min_samples_split
            || n_samples <= self.min_samples_leaf
            || self.max_depth.is_some_and(|d| depth >= d)
            || is_pure(&y_subset);

        if should_stop {
            return TreeNode::Leaf {
                value: self.compute_leaf_value(&y_subset),
                n_samples,
            };
        }

        if let Some((best_feature, best_threshold)) = self.find_best_split(x, y, indices) {
            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| x[[i, best_feature]] <= best_threshold);

            if left_indices.len() < self.min_samples_leaf
                || right_indices.len() < self.min_samples_leaf
            {
                return TreeNode::Leaf {
                    value: self.compute_leaf_value(&y_subset),
                    n_samples,
                };
            }

            let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1));
            let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1));

            TreeNode::Split {
                feature_idx: best_feature,
                threshold: best_threshold,
                left,
                right,
                n_samples,
            }
        } else {
            TreeNode::Leaf {
                value: self.compute_leaf_value(&y_subset),
                n_samples,
            }
        }
    }

    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
    ) -> Option<(usize, f64)> {
        let y_subset: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
        let parent_impurity = self.compute_impurity(&y_subset);

        // Each feature scans its candidate thresholds independently
        let feature_results: Vec<Option<(usize, f64, f64)>> = (0..x.ncols())
            .into_par_iter()
            .map(|feature_idx| {
                let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature_idx]]).collect();
                values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                values.dedup();

                let mut best_gain = 0.0f64;
                let mut best_threshold = 0.0f64;

                for window in values.windows(2) {
                    let threshold = (window[0] + window[1]) / 2.0;

                    let mut left = SplitStats::default();
                    let mut right = SplitStats::default();
                    for &idx in indices {
                        let yi = y[idx];
                        if x[[idx, feature_idx]] <= threshold {
                            left.push(yi);
                        } else {
                            right.push(yi);
                        }
                    }

                    if left.count < self.min_samples_leaf || right.count < self.min_samples_leaf {
                        continue;
                    }

                    let n = indices.len() as f64;
                    let weighted = (left.count as f64 * left.impurity(self.criterion)
                        + right.count as f64 * right.impurity(self.criterion))
                        / n;

                    let gain = parent_impurity - weighted;
                    if gain > best_gain {
                        best_gain = gain;
                        best_threshold = threshold;
                    }
                }

                (best_gain > 0.0).then_some((feature_idx, best_threshold, best_gain))
            })
            .collect();

        feature_results
            .into_iter()
            .flatten()
            .max_by(|a, b| {
                a.2.partial_cmp(&b.2)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    // lowest feature index wins ties, keeps fits reproducible
                    .then_with(|| b.0.cmp(&a.0))
            })
            .map(|(f, t, _)| (f, t))
    }

    fn compute_impurity(&self, y: &[f64]) -> f64 {
        let mut stats = SplitStats::default();
        for &v in y {
            stats.push(v);
        }
        stats.impurity(self.criterion)
    }

    fn compute_leaf_value(&self, y: &[f64]) -> f64 {
        if y.is_empty() {
            return 0.0;
        }

        if self.is_classification {
            let mut counts: HashMap<i64, usize> = HashMap::new();
            for &val in y {
                *counts.entry(val.round() as i64).or_insert(0) += 1;
            }
            // highest count wins, lowest class label on ties
            counts
                .into_iter()
                .max_by(|(ca, na), (cb, nb)| na.cmp(nb).then_with(|| cb.cmp(ca)))
                .map(|(class, _)| class as f64)
                .unwrap_or(0.0)
        } else {
            y.iter().sum::<f64>() / y.len() as f64
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(CoursecastError::ModelNotFitted)?;

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| predict_sample(root, &x.row(i).to_vec()))
            .collect();

        Ok(Array1::from_vec(predictions))
    }
}

fn predict_sample(node: &TreeNode, sample: &[f64]) -> f64 {
    match node {
        TreeNode::Leaf { value, .. } => *value,
        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
            ..
        } => {
            if sample[*feature_idx] <= *threshold {
                predict_sample(left, sample)
            } else {
                predict_sample(right, sample)
            }
        }
    }
}

fn is_pure(y: &[f64]) -> bool {
    match y.first() {
        None => true,
        Some(&first) => y.iter().all(|&v| (v - first).abs() < 1e-10),
    }
}

/// Incremental per-side statistics for one candidate threshold.
#[derive(Default)]
struct SplitStats {
    count: usize,
    sum: f64,
    sq_sum: f64,
    class_counts: HashMap<i64, usize>,
}

impl SplitStats {
    fn push(&mut self, yi: f64) {
        self.count += 1;
        self.sum += yi;
        self.sq_sum += yi * yi;
        *self.class_counts.entry(yi.round() as i64).or_insert(0) += 1;
    }

    fn impurity(&self, criterion: Criterion) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let n = self.count as f64;
        match criterion {
            Criterion::Gini => {
                let mut gini = 1.0;
                for &c in self.class_counts.values() {
                    let p = c as f64 / n;
                    gini -= p * p;
                }
                gini
            }
            Criterion::Mse => self.sq_sum / n - (self.sum / n).powi(2),
        }
    }
}
