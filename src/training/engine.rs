//! The training engine
//!
//! One offline batch run: validate the table, fit the feature pipeline,
//! split deterministically, fit every candidate classifier, pick the best
//! by held-out accuracy, and assemble the bundle. Failures are fatal and
//! nothing is persisted by this module.

use crate::bundle::ModelBundle;
use crate::error::{CoursecastError, Result};
use crate::preprocessing::{FeaturePipeline, PipelineConfig};
use crate::training::{
    ClassificationReport, GradientBoostingClassifier, GradientBoostingConfig, LogisticRegression,
    RandomForestClassifier, TrainedClassifier,
};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// Name of the 0/1 label column
    pub label_column: String,
    /// Held-out fraction, in (0, 1)
    pub test_size: f64,
    /// Seed for the split and the seeded classifiers
    pub seed: u64,
    pub pipeline: PipelineConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            label_column: "completed_course".to_string(),
            test_size: 0.2,
            seed: 42,
            pipeline: PipelineConfig::course_completion(),
        }
    }
}

pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Run one training job over a labeled table.
    pub fn train(&self, df: &DataFrame) -> Result<ModelBundle> {
        self.validate_table(df)?;

        let y = self.extract_labels(df)?;
        let features = df.drop(&self.config.label_column)?;

        let (pipeline, matrix) = FeaturePipeline::fit(&features, &self.config.pipeline)?;
        info!(
            rows = matrix.nrows(),
            features = matrix.ncols(),
            "feature pipeline fitted"
        );

        let (train_idx, test_idx) = self.split_indices(matrix.nrows())?;
        let x_train = matrix.select(Axis(0), &train_idx);
        let x_test = matrix.select(Axis(0), &test_idx);
        let y_train: Array1<f64> = Array1::from_vec(train_idx.iter().map(|&i| y[i]).collect());
        let y_test: Array1<f64> = Array1::from_vec(test_idx.iter().map(|&i| y[i]).collect());

        let candidates = self.fit_candidates(&x_train, &y_train, &x_test, &y_test)?;

        // strictly-highest accuracy wins; the earlier candidate keeps ties
        let (best, best_report) = candidates
            .into_iter()
            .reduce(|winner, challenger| {
                if challenger.1.accuracy > winner.1.accuracy {
                    challenger
                } else {
                    winner
                }
            })
            .ok_or_else(|| {
                CoursecastError::TrainingError("no candidate classifier was trained".to_string())
            })?;

        info!(
            classifier = best.name(),
            accuracy = best_report.accuracy,
            "selected classifier"
        );

        Ok(ModelBundle::new(best, pipeline, best_report.accuracy))
    }

    fn validate_table(&self, df: &DataFrame) -> Result<()> {
        if df.height() == 0 {
            return Err(CoursecastError::TrainingError(
                "training table has no rows".to_string(),
            ));
        }

        if df.column(&self.config.label_column).is_err() {
            return Err(CoursecastError::TrainingError(format!(
                "label column '{}' not found",
                self.config.label_column
            )));
        }

        let missing: Vec<&str> = self
            .config
            .pipeline
            .required_columns()
            .filter(|c| df.column(c).is_err())
            .map(|c| c.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(CoursecastError::TrainingError(format!(
                "required feature columns missing: {}",
                missing.join(", ")
            )));
        }

        if !(self.config.test_size > 0.0 && self.config.test_size < 1.0) {
            return Err(CoursecastError::TrainingError(format!(
                "test_size must be in (0, 1), got {}",
                self.config.test_size
            )));
        }

        Ok(())
    }

    fn extract_labels(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let labels: Vec<f64> = df
            .column(&self.config.label_column)?
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| {
                v.ok_or_else(|| {
                    CoursecastError::TrainingError(format!(
                        "label column '{}' contains nulls",
                        self.config.label_column
                    ))
                })
            })
            .collect::<Result<_>>()?;
        Ok(Array1::from_vec(labels))
    }

    /// Deterministic shuffled split; the held-out size is `ceil(n * test_size)`.
    fn split_indices(&self, n: usize) -> Result<(Vec<usize>, Vec<usize>)> {
        let n_test = ((n as f64) * self.config.test_size).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(CoursecastError::TrainingError(format!(
                "cannot split {} rows into train/test with test_size {}",
                n, self.config.test_size
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        indices.shuffle(&mut rng);

        let test_idx = indices.split_off(n - n_test);
        Ok((indices, test_idx))
    }

    fn fit_candidates(
        &self,
        x_train: &Array2<f64>,
        y_train: &Array1<f64>,
        x_test: &Array2<f64>,
        y_test: &Array1<f64>,
    ) -> Result<Vec<(TrainedClassifier, ClassificationReport)>> {
        let mut candidates = Vec::with_capacity(3);

        let mut logistic = LogisticRegression::new();
        logistic.fit(x_train, y_train)?;
        candidates.push(TrainedClassifier::LogisticRegression(logistic));

        let mut forest = RandomForestClassifier::new(100).with_random_state(self.config.seed);
        forest.fit(x_train, y_train)?;
        candidates.push(TrainedClassifier::RandomForest(forest));

        let mut boosting = GradientBoostingClassifier::new(GradientBoostingConfig {
            random_state: self.config.seed,
            ..Default::default()
        });
        boosting.fit(x_train, y_train)?;
        candidates.push(TrainedClassifier::GradientBoosting(boosting));

        candidates
            .into_iter()
            .map(|classifier| {
                let predictions = classifier.predict(x_test)?;
                let report = ClassificationReport::compute(y_test, &predictions);
                info!(
                    candidate = classifier.name(),
                    accuracy = report.accuracy,
                    precision = report.precision,
                    recall = report.recall,
                    f1 = report.f1,
                    "candidate evaluated"
                );
                Ok((classifier, report))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled_frame(n: usize) -> DataFrame {
        let completed: Vec<f64> = (0..n).map(|i| if i % 2 == 0 { 1.0 } else { 0.0 }).collect();
        let videos: Vec<f64> = completed.iter().map(|&c| 20.0 + c * 60.0).collect();
        let assignments: Vec<f64> = completed.iter().map(|&c| 1.0 + c * 8.0).collect();
        df!(
            "age" => (0..n).map(|i| 20.0 + (i % 30) as f64).collect::<Vec<f64>>(),
            "continent" => (0..n).map(|i| if i % 3 == 0 { "Asia" } else { "Europe" }).collect::<Vec<&str>>(),
            "education_level" => vec!["Bachelors"; n],
            "hours_per_week" => (0..n).map(|i| 2.0 + (i % 10) as f64).collect::<Vec<f64>>(),
            "num_logins_last_month" => (0..n).map(|i| (i % 25) as f64).collect::<Vec<f64>>(),
            "videos_watched_pct" => videos,
            "assignments_submitted" => assignments,
            "discussion_posts" => (0..n).map(|i| (i % 7) as f64).collect::<Vec<f64>>(),
            "is_working_professional" => (0..n).map(|i| (i % 2) as f64).collect::<Vec<f64>>(),
            "preferred_device" => (0..n).map(|i| if i % 2 == 0 { "laptop" } else { "phone" }).collect::<Vec<&str>>(),
            "completed_course" => completed,
        )
        .unwrap()
    }

    #[test]
    fn test_train_produces_bundle() {
        let df = labeled_frame(60);
        let bundle = Trainer::new(TrainerConfig::default()).train(&df).unwrap();

        assert!(bundle.manifest().validation_accuracy >= 0.5);
        assert!(!bundle.pipeline().feature_names().is_empty());
    }

    #[test]
    fn test_missing_label_is_fatal() {
        let df = labeled_frame(20).drop("completed_course").unwrap();
        let result = Trainer::new(TrainerConfig::default()).train(&df);
        assert!(matches!(result, Err(CoursecastError::TrainingError(_))));
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let df = labeled_frame(20).drop("continent").unwrap();
        let result = Trainer::new(TrainerConfig::default()).train(&df);

        match result {
            Err(CoursecastError::TrainingError(msg)) => assert!(msg.contains("continent")),
            other => panic!("expected TrainingError, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_split_is_deterministic() {
        let trainer = Trainer::new(TrainerConfig::default());
        let (a_train, a_test) = trainer.split_indices(50).unwrap();
        let (b_train, b_test) = trainer.split_indices(50).unwrap();

        assert_eq!(a_train, b_train);
        assert_eq!(a_test, b_test);
        assert_eq!(a_test.len(), 10);
    }

    #[test]
    fn test_split_too_small_fails() {
        let trainer = Trainer::new(TrainerConfig::default());
        assert!(trainer.split_indices(1).is_err());
    }
}
