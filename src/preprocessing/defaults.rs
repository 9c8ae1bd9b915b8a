//! Imputation defaults learned once at training time and replayed at
//! inference time

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Per-column imputation defaults: the mode of each configured categorical
/// column and the median of each configured numeric column, frozen for the
/// lifetime of a bundle.
///
/// `apply` never rejects a gap: nulls are filled with the stored default,
/// and a column missing from the input altogether is created outright,
/// filled entirely with the default. That creation step is what keeps
/// inference robust against partial payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepDefaults {
    categorical_mode: BTreeMap<String, String>,
    numeric_median: BTreeMap<String, f64>,
}

impl PrepDefaults {
    /// Learn defaults from the training data.
    ///
    /// A categorical column that is absent or entirely null gets the empty
    /// string; an absent numeric column gets 0.0.
    pub fn fit(df: &DataFrame, categorical: &[String], median: &[String]) -> Result<Self> {
        let mut categorical_mode = BTreeMap::new();
        for col_name in categorical {
            let mode = match df.column(col_name) {
                Ok(col) => column_mode(col.as_materialized_series()),
                Err(_) => String::new(),
            };
            categorical_mode.insert(col_name.clone(), mode);
        }

        let mut numeric_median = BTreeMap::new();
        for col_name in median {
            let value = match df.column(col_name) {
                Ok(col) => col
                    .cast(&DataType::Float64)?
                    .f64()?
                    .median()
                    .unwrap_or(0.0),
                Err(_) => 0.0,
            };
            numeric_median.insert(col_name.clone(), value);
        }

        Ok(Self {
            categorical_mode,
            numeric_median,
        })
    }

    /// Fill gaps in the configured columns, creating any column that is
    /// missing from the input.
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let n = df.height();
        let mut result = df.clone();

        for (col_name, mode) in &self.categorical_mode {
            let filled = match result.column(col_name) {
                Ok(col) => match col.as_materialized_series().str() {
                    Ok(ca) => {
                        let values: StringChunked = ca
                            .into_iter()
                            .map(|opt| Some(opt.unwrap_or(mode.as_str()).to_string()))
                            .collect();
                        values.with_name(col_name.as_str().into()).into_series()
                    }
                    // Present but not a string column (e.g. all-null from a
                    // sparse payload): replace with the default wholesale.
                    Err(_) => constant_str(col_name, mode, n),
                },
                Err(_) => constant_str(col_name, mode, n),
            };
            result = result.with_column(filled)?.clone();
        }

        for (col_name, median) in &self.numeric_median {
            let filled = match result.column(col_name) {
                Ok(col) => {
                    let ca = col.cast(&DataType::Float64)?;
                    let values: Float64Chunked = ca
                        .f64()?
                        .into_iter()
                        .map(|opt| Some(opt.unwrap_or(*median)))
                        .collect();
                    values.with_name(col_name.as_str().into()).into_series()
                }
                Err(_) => Series::new(col_name.as_str().into(), vec![*median; n]),
            };
            result = result.with_column(filled)?.clone();
        }

        Ok(result)
    }

    /// The configured categorical columns (the set inference expands).
    pub fn categorical_columns(&self) -> impl Iterator<Item = &String> {
        self.categorical_mode.keys()
    }

    /// Learned mode for a categorical column, if configured.
    pub fn mode_for(&self, column: &str) -> Option<&str> {
        self.categorical_mode.get(column).map(|s| s.as_str())
    }

    /// Learned median for a numeric column, if configured.
    pub fn median_for(&self, column: &str) -> Option<f64> {
        self.numeric_median.get(column).copied()
    }
}

fn constant_str(name: &str, value: &str, n: usize) -> Series {
    Series::new(name.into(), vec![value.to_string(); n])
}

/// Most frequent value; ties broken by first observation order so the
/// learned default is a deterministic function of the training data.
fn column_mode(series: &Series) -> String {
    let ca = match series.str() {
        Ok(ca) => ca,
        Err(_) => return String::new(),
    };

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: HashMap<&str, usize> = HashMap::new();

    for (idx, val) in ca.into_iter().enumerate() {
        if let Some(v) = val {
            *counts.entry(v).or_insert(0) += 1;
            first_seen.entry(v).or_insert(idx);
        }
    }

    counts
        .into_iter()
        .max_by(|(a, ca), (b, cb)| {
            ca.cmp(cb)
                .then_with(|| first_seen[b].cmp(&first_seen[a]))
        })
        .map(|(v, _)| v.to_string())
        .unwrap_or_default()
}
