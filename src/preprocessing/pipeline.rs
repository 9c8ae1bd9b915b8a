//! The shared transform contract
//!
//! [`FeaturePipeline`] is the one object both the trainer and the inference
//! engine go through to turn a raw record set into the fixed-width scaled
//! matrix the classifiers consume. Training fits it once; inference rebuilds
//! it from persisted parts and calls [`FeaturePipeline::transform`].

use crate::error::{CoursecastError, Result};
use crate::features::{self, add_derived_features};
use crate::preprocessing::{expand_observed, IndicatorEncoder, PrepDefaults, StandardScaler};
use ndarray::Array2;
use polars::prelude::*;

/// Which raw columns the pipeline treats as what.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Raw numeric feature columns, in output order.
    pub numeric_columns: Vec<String>,
    /// Categorical columns to indicator-encode.
    pub categorical_columns: Vec<String>,
    /// Numeric columns imputed with the training median (others are
    /// zero-filled by alignment).
    pub median_columns: Vec<String>,
}

impl PipelineConfig {
    /// The course-completion feature set.
    pub fn course_completion() -> Self {
        Self {
            numeric_columns: vec![
                "age".to_string(),
                "hours_per_week".to_string(),
                "num_logins_last_month".to_string(),
                "videos_watched_pct".to_string(),
                "assignments_submitted".to_string(),
                "discussion_posts".to_string(),
                "is_working_professional".to_string(),
            ],
            categorical_columns: vec![
                "continent".to_string(),
                "education_level".to_string(),
                "preferred_device".to_string(),
            ],
            median_columns: vec!["videos_watched_pct".to_string()],
        }
    }

    /// Columns the training table must carry.
    pub fn required_columns(&self) -> impl Iterator<Item = &String> {
        self.numeric_columns
            .iter()
            .chain(self.categorical_columns.iter())
    }
}

/// Fitted feature pipeline: imputation defaults, the frozen feature name
/// list, and the fitted scaler.
///
/// The feature name list is the authoritative schema; its order is
/// index-aligned with the scaler statistics.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    defaults: PrepDefaults,
    feature_names: Vec<String>,
    scaler: StandardScaler,
}

impl FeaturePipeline {
    /// Fit the pipeline on the training table and return it together with
    /// the scaled training matrix.
    pub fn fit(df: &DataFrame, config: &PipelineConfig) -> Result<(Self, Array2<f64>)> {
        let engineered = add_derived_features(df)?;
        let defaults = PrepDefaults::fit(
            &engineered,
            &config.categorical_columns,
            &config.median_columns,
        )?;
        let filled = defaults.apply(&engineered)?;

        let encoder = IndicatorEncoder::fit(&filled, &config.categorical_columns)?;
        let encoded = encoder.transform(&filled)?;

        let mut feature_names = config.numeric_columns.clone();
        feature_names.push(features::BMI.to_string());
        feature_names.push(features::ENGAGEMENT_SCORE.to_string());
        feature_names.extend(encoder.feature_names());

        let matrix = aligned_matrix(&encoded, &feature_names)?;
        let (scaler, scaled) = StandardScaler::fit_transform(&matrix)?;

        let pipeline = Self {
            defaults,
            feature_names,
            scaler,
        };
        Ok((pipeline, scaled))
    }

    /// Rebuild a pipeline from persisted parts.
    pub fn from_parts(
        defaults: PrepDefaults,
        feature_names: Vec<String>,
        scaler: StandardScaler,
    ) -> Result<Self> {
        if scaler.n_features() != feature_names.len() {
            return Err(CoursecastError::ShapeError {
                expected: format!("{} scaler columns", feature_names.len()),
                actual: format!("{} scaler columns", scaler.n_features()),
            });
        }
        Ok(Self {
            defaults,
            feature_names,
            scaler,
        })
    }

    /// Transform a raw record set into the scaled feature matrix.
    ///
    /// Always yields exactly `feature_names().len()` columns: absent columns
    /// are zero-filled and unexpected ones discarded by alignment.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let engineered = add_derived_features(df)?;
        let filled = self.defaults.apply(&engineered)?;

        let categorical: Vec<String> = self.defaults.categorical_columns().cloned().collect();
        let expanded = expand_observed(&filled, &categorical)?;

        let matrix = aligned_matrix(&expanded, &self.feature_names)?;
        self.scaler.transform(&matrix)
    }

    /// The frozen feature name list, in matrix column order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn defaults(&self) -> &PrepDefaults {
        &self.defaults
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }
}

/// Reindex a DataFrame against an ordered column list into a dense matrix.
///
/// Expected-but-absent columns are zero-filled, unexpected columns are
/// dropped, and in-column nulls become 0.0.
pub fn aligned_matrix(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
    let n = df.height();
    let mut data: Vec<Vec<f64>> = Vec::with_capacity(columns.len());

    for col_name in columns {
        let values = match df.column(col_name) {
            Ok(col) => col
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect(),
            Err(_) => vec![0.0; n],
        };
        data.push(values);
    }

    Ok(Array2::from_shape_fn((n, columns.len()), |(i, j)| {
        data[j][i]
    }))
}
