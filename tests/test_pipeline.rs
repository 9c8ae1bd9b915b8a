//! Integration test: feature pipeline end-to-end, train through serve

use coursecast::inference::{FieldValue, InferenceEngine, PredictInput, Record};
use coursecast::preprocessing::{FeaturePipeline, PipelineConfig};
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
        "height_cm" => (0..n).map(|i| 160.0 + (i % 30) as f64).collect::<Vec<f64>>(),
        "weight_kg" => (0..n).map(|i| 55.0 + (i % 40) as f64).collect::<Vec<f64>>(),
        "completed_course" => completed,
    )
    .unwrap()
}

fn fitted_pipeline() -> FeaturePipeline {
    let df = training_frame(60).drop("completed_course").unwrap();
    let (pipeline, _) = FeaturePipeline::fit(&df, &PipelineConfig::course_completion()).unwrap();
    pipeline
}

fn record(fields: &[(&str, FieldValue)]) -> Record {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn test_transform_is_idempotent() {
    let pipeline = fitted_pipeline();
    let input = df!(
        "age" => &[25.0],
        "continent" => &["Asia"],
        "videos_watched_pct" => &[70.0],
    )
    .unwrap();

    let a = pipeline.transform(&input).unwrap();
    let b = pipeline.transform(&input).unwrap();
    assert_eq!(a, b, "same input must produce the same matrix");
}

#[test]
fn test_column_width_invariant_across_inputs() {
    let pipeline = fitted_pipeline();
    let expected = pipeline.feature_names().len();

    let full = training_frame(5).drop("completed_course").unwrap();
    let sparse = df!("age" => &[30.0]).unwrap();
    let with_extras = df!(
        "age" => &[30.0],
        "favorite_color" => &["green"],
    )
    .unwrap();

    for input in [&full, &sparse, &with_extras] {
        let matrix = pipeline.transform(input).unwrap();
        assert_eq!(matrix.ncols(), expected, "width must match the schema");
    }
}

#[test]
fn test_missing_columns_never_error() {
    let pipeline = fitted_pipeline();
    let input = df!("discussion_posts" => &[2.0]).unwrap();

    let matrix = pipeline.transform(&input).unwrap();
    assert_eq!(matrix.nrows(), 1);
    assert!(matrix.iter().all(|v| v.is_finite()));
}

#[test]
fn test_bmi_zero_height_stays_finite_through_pipeline() {
    let pipeline = fitted_pipeline();
    let input = df!(
        "height_cm" => &[0.0],
        "weight_kg" => &[70.0],
    )
    .unwrap();

    let matrix = pipeline.transform(&input).unwrap();
    assert!(matrix.iter().all(|v| v.is_finite()));
}

#[test]
fn test_train_serve_parity() {
    let df = training_frame(60).drop("completed_course").unwrap();
    let (pipeline, fitted) = FeaturePipeline::fit(&df, &PipelineConfig::course_completion()).unwrap();

    let served = pipeline.transform(&df).unwrap();
    assert_eq!(fitted.shape(), served.shape());
    for (a, b) in fitted.iter().zip(served.iter()) {
        assert!(
            (a - b).abs() < 1e-9,
            "serve-path transform must reproduce the training matrix"
        );
    }
}

#[test]
fn test_end_to_end_train_save_load_predict() {
    let df = training_frame(90);
    let bundle = Trainer::new(TrainerConfig::default()).train(&df).unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("bundle");
    bundle.save(&dir).unwrap();

    let engine = InferenceEngine::load(&dir).unwrap();

    let strong = record(&[
        ("age", FieldValue::Int(24)),
        ("continent", FieldValue::Str("Asia".to_string())),
        ("videos_watched_pct", FieldValue::Float(90.0)),
        ("assignments_submitted", FieldValue::Int(8)),
        ("discussion_posts", FieldValue::Int(5)),
        ("hours_per_week", FieldValue::Float(10.0)),
    ]);
    let labels = engine.predict(PredictInput::Single(strong)).unwrap();
    assert_eq!(labels.len(), 1);
    assert!(labels[0] == 0 || labels[0] == 1);
}

#[test]
fn test_unseen_category_handled_silently() {
    let df = training_frame(90);
    let bundle = Trainer::new(TrainerConfig::default()).train(&df).unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("bundle");
    bundle.save(&dir).unwrap();
    let engine = InferenceEngine::load(&dir).unwrap();

    let input = record(&[
        ("age", FieldValue::Int(30)),
        ("continent", FieldValue::Str("Atlantis".to_string())),
    ]);
    let labels = engine.predict(PredictInput::Single(input)).unwrap();
    assert_eq!(labels.len(), 1, "unseen categories are approximated, not rejected");
}

#[test]
fn test_batch_consistent_with_singles() {
    let df = training_frame(90);
    let bundle = Trainer::new(TrainerConfig::default()).train(&df).unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("bundle");
    bundle.save(&dir).unwrap();
    let engine = InferenceEngine::load(&dir).unwrap();

    let records: Vec<Record> = (0..5)
        .map(|i| {
            record(&[
                ("age", FieldValue::Int(20 + i * 5)),
                ("continent", FieldValue::Str("Europe".to_string())),
                ("videos_watched_pct", FieldValue::Float(10.0 + i as f64 * 20.0)),
                ("assignments_submitted", FieldValue::Int(i)),
                ("discussion_posts", FieldValue::Int(2)),
            ])
        })
        .collect();

    let batched = engine.predict(PredictInput::Batch(records.clone())).unwrap();
    for (i, r) in records.into_iter().enumerate() {
        let single = engine.predict(PredictInput::Single(r)).unwrap();
        assert_eq!(batched[i], single[0], "record {} differs between batch and single", i);
    }
}
