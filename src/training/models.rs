//! Evaluation metrics and the trained-classifier wrapper

use crate::error::Result;
use crate::training::{GradientBoostingClassifier, LogisticRegression, RandomForestClassifier};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Binary classification metrics over a held-out partition.
///
/// Precision, recall, and F1 treat class 1 (completed) as positive and fall
/// back to 0.0 when undefined.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl ClassificationReport {
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let n = y_true.len();
        let correct = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| (*t - *p).abs() < 0.5)
            .count();
        let accuracy = if n > 0 { correct as f64 / n as f64 } else { 0.0 };

        let (tp, fp, fn_) = confusion_counts(y_true, y_pred);

        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };
        let recall = if tp + fn_ > 0 {
            tp as f64 / (tp + fn_) as f64
        } else {
            0.0
        };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            accuracy,
            precision,
            recall,
            f1,
        }
    }
}

fn confusion_counts(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> (usize, usize, usize) {
    let mut tp = 0;
    let mut fp = 0;
    let mut fn_ = 0;

    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        match (*t > 0.5, *p > 0.5) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }

    (tp, fp, fn_)
}

/// The classifier a training run selected, serializable as one artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedClassifier {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForestClassifier),
    GradientBoosting(GradientBoostingClassifier),
}

impl TrainedClassifier {
    /// Stable snake_case identifier, used as the artifact file stem.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LogisticRegression(_) => "logistic_regression",
            Self::RandomForest(_) => "random_forest",
            Self::GradientBoosting(_) => "gradient_boosting",
        }
    }

    /// Predict 0/1 labels.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Self::LogisticRegression(m) => m.predict(x),
            Self::RandomForest(m) => m.predict(x),
            Self::GradientBoosting(m) => m.predict(x),
        }
    }

    /// Predict the probability of class 1.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Self::LogisticRegression(m) => m.predict_proba(x),
            Self::RandomForest(m) => m.predict_proba(x),
            Self::GradientBoosting(m) => m.predict_proba(x),
        }
    }
}
