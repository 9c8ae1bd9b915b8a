//! Derived feature engineering
//!
//! Adds the two computed columns the model was trained with: body-mass index
//! and an engagement score. Both are all-or-nothing on their source columns:
//! if a source column is absent from the record set, the derived column is
//! filled with 0.0 for every row. This runs before imputation and must behave
//! identically in training and inference.

use crate::error::Result;
use polars::prelude::*;

/// Derived column: body-mass index
pub const BMI: &str = "bmi";
/// Derived column: row-wise engagement score
pub const ENGAGEMENT_SCORE: &str = "engagement_score";

const HEIGHT_CM: &str = "height_cm";
const WEIGHT_KG: &str = "weight_kg";
const ENGAGEMENT_PARTS: [&str; 3] = [
    "videos_watched_pct",
    "assignments_submitted",
    "discussion_posts",
];

/// Add `bmi` and `engagement_score` columns to the record set.
///
/// Existing columns are untouched; the two derived columns are appended.
pub fn add_derived_features(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();

    let bmi = compute_bmi(df)?;
    result = result.with_column(bmi)?.clone();

    let engagement = compute_engagement(df)?;
    result = result.with_column(engagement)?.clone();

    Ok(result)
}

/// `weight_kg / (height_cm / 100)^2`, guarded: a null, zero, or negative
/// height yields 0.0, as does a nonfinite result. Either source column
/// absent yields an all-zero column.
fn compute_bmi(df: &DataFrame) -> Result<Series> {
    let n = df.height();

    if df.column(HEIGHT_CM).is_err() || df.column(WEIGHT_KG).is_err() {
        return Ok(Series::new(BMI.into(), vec![0.0f64; n]));
    }

    let heights = column_as_f64(df, HEIGHT_CM)?;
    let weights = column_as_f64(df, WEIGHT_KG)?;

    let values: Float64Chunked = heights
        .into_iter()
        .zip(weights)
        .map(|(h, w)| {
            let bmi = match (h, w) {
                (Some(h), Some(w)) if h > 0.0 => w / (h / 100.0).powi(2),
                _ => 0.0,
            };
            Some(if bmi.is_finite() { bmi } else { 0.0 })
        })
        .collect();

    Ok(values.with_name(BMI.into()).into_series())
}

/// Row-wise sum of the engagement columns, nulls counted as 0. If any of the
/// three columns is wholly absent the score is 0.0 for every row.
fn compute_engagement(df: &DataFrame) -> Result<Series> {
    let n = df.height();

    let all_present = ENGAGEMENT_PARTS.iter().all(|c| df.column(c).is_ok());
    if !all_present {
        return Ok(Series::new(ENGAGEMENT_SCORE.into(), vec![0.0f64; n]));
    }

    let mut totals = vec![0.0f64; n];
    for col_name in ENGAGEMENT_PARTS {
        let values = column_as_f64(df, col_name)?;
        for (total, v) in totals.iter_mut().zip(values) {
            *total += v.unwrap_or(0.0);
        }
    }

    Ok(Series::new(ENGAGEMENT_SCORE.into(), totals))
}

fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let casted = df.column(name)?.cast(&DataType::Float64)?;
    Ok(casted.f64()?.into_iter().collect())
}
