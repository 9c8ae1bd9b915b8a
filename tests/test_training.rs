//! Integration test: trainer failure modes and candidate selection

use coursecast::error::CoursecastError;
use coursecast::training::{Trainer, TrainerConfig};
use polars::prelude::*;

fn training_frame(n: usize) -> DataFrame {
    let completed: Vec<f64> = (0..n).map(|i| if i % 3 != 0 { 1.0 } else { 0.0 }).collect();
    df!(
        "age" => (0..n).map(|i| 18.0 + (i % 40) as f64).collect::<Vec<f64>>(),
        "continent" => (0..n).map(|i| ["Asia", "Europe", "Africa"][i % 3]).collect::<Vec<&str>>(),
        "education_level" => (0..n).map(|i| if i % 2 == 0 { "Bachelors" } else { "Masters" }).collect::<Vec<&str>>(),
        "hours_per_week" => (0..n).map(|i| 1.0 + (i % 12) as f64).collect::<Vec<f64>>(),
        "num_logins_last_month" => (0..n).map(|i| (i % 28) as f64).collect::<Vec<f64>>(),
        "videos_watched_pct" => completed.iter().enumerate().map(|(i, &c)| 15.0 + c * 55.0 + (i % 10) as f64).collect::<Vec<f64>>(),
        "assignments_submitted" => completed.iter().map(|&c| 1.0 + c * 7.0).collect::<Vec<f64>>(),
        "discussion_posts" => (0..n).map(|i| (i % 6) as f64).collect::<Vec<f64>>(),
        "is_working_professional" => (0..n).map(|i| (i % 2) as f64).collect::<Vec<f64>>(),
        "preferred_device" => (0..n).map(|i| if i % 2 == 0 { "laptop" } else { "phone" }).collect::<Vec<&str>>(),
        "completed_course" => completed,
    )
    .unwrap()
}

#[test]
fn test_training_selects_a_candidate() {
    let bundle = Trainer::new(TrainerConfig::default())
        .train(&training_frame(90))
        .unwrap();

    let name = &bundle.manifest().classifier_name;
    assert!(
        ["logistic_regression", "random_forest", "gradient_boosting"].contains(&name.as_str()),
        "unexpected classifier: {}",
        name
    );
    assert!(bundle.manifest().validation_accuracy > 0.5);
}

#[test]
fn test_training_is_deterministic_for_a_seed() {
    let df = training_frame(90);
    let a = Trainer::new(TrainerConfig::default()).train(&df).unwrap();
    let b = Trainer::new(TrainerConfig::default()).train(&df).unwrap();

    assert_eq!(
        a.manifest().classifier_name,
        b.manifest().classifier_name,
        "same data and seed must select the same classifier"
    );
    assert_eq!(
        a.manifest().validation_accuracy,
        b.manifest().validation_accuracy
    );
}

#[test]
fn test_missing_label_aborts() {
    let df = training_frame(30).drop("completed_course").unwrap();
    let result = Trainer::new(TrainerConfig::default()).train(&df);

    match result {
        Err(CoursecastError::TrainingError(msg)) => assert!(msg.contains("completed_course")),
        other => panic!("expected TrainingError, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_missing_required_columns_abort_with_names() {
    let df = training_frame(30)
        .drop("continent")
        .unwrap()
        .drop("hours_per_week")
        .unwrap();
    let result = Trainer::new(TrainerConfig::default()).train(&df);

    match result {
        Err(CoursecastError::TrainingError(msg)) => {
            assert!(msg.contains("continent"));
            assert!(msg.contains("hours_per_week"));
        }
        other => panic!("expected TrainingError, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_empty_table_aborts() {
    let df = training_frame(30).head(Some(0));
    let result = Trainer::new(TrainerConfig::default()).train(&df);
    assert!(matches!(result, Err(CoursecastError::TrainingError(_))));
}

#[test]
fn test_nothing_written_on_failed_run() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("bundle");

    let df = training_frame(30).drop("completed_course").unwrap();
    let result = Trainer::new(TrainerConfig::default()).train(&df);

    assert!(result.is_err());
    assert!(!dir.exists(), "a failed run must not leave a partial bundle");
}

#[test]
fn test_custom_seed_and_split() {
    let df = training_frame(100);
    let bundle = Trainer::new(TrainerConfig {
        seed: 7,
        test_size: 0.3,
        ..Default::default()
    })
    .train(&df)
    .unwrap();

    assert!(bundle.manifest().validation_accuracy >= 0.0);
    assert!(bundle.manifest().validation_accuracy <= 1.0);
}
