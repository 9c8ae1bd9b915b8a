//! Column-wise standardization

use crate::error::{CoursecastError, Result};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Standard scaler: per-column mean and population standard deviation.
///
/// A constant column (standard deviation 0) transforms to 0.0 for every row
/// rather than dividing by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl StandardScaler {
    /// Learn per-column statistics from the training matrix.
    pub fn fit(matrix: &Array2<f64>) -> Result<Self> {
        let n = matrix.nrows();
        if n == 0 {
            return Err(CoursecastError::DataError(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }

        let mean: Vec<f64> = matrix
            .axis_iter(Axis(1))
            .map(|col| col.sum() / n as f64)
            .collect();

        let std: Vec<f64> = matrix
            .axis_iter(Axis(1))
            .zip(&mean)
            .map(|(col, &m)| {
                let var = col.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n as f64;
                var.sqrt()
            })
            .collect();

        Ok(Self { mean, std })
    }

    /// Standardize a matrix with the fitted statistics.
    pub fn transform(&self, matrix: &Array2<f64>) -> Result<Array2<f64>> {
        if matrix.ncols() != self.mean.len() {
            return Err(CoursecastError::ShapeError {
                expected: format!("{} columns", self.mean.len()),
                actual: format!("{} columns", matrix.ncols()),
            });
        }

        let mut scaled = matrix.clone();
        for (j, mut col) in scaled.axis_iter_mut(Axis(1)).enumerate() {
            let (m, s) = (self.mean[j], self.std[j]);
            if s > 0.0 {
                col.mapv_inplace(|v| (v - m) / s);
            } else {
                col.fill(0.0);
            }
        }
        Ok(scaled)
    }

    /// Fit and transform in one pass.
    pub fn fit_transform(matrix: &Array2<f64>) -> Result<(Self, Array2<f64>)> {
        let scaler = Self::fit(matrix)?;
        let scaled = scaler.transform(matrix)?;
        Ok((scaler, scaled))
    }

    /// Number of columns the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }
}
