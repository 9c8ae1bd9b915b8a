//! Indicator (one-hot) encoding of categorical columns
//!
//! Training fits an [`IndicatorEncoder`] that remembers the category
//! vocabulary per column and drops the first-seen category of each column as
//! the reference level. Serving uses [`expand_observed`], which emits an
//! indicator for every value it sees; the downstream alignment step against
//! the frozen feature name list then discards reference-level and unseen
//! indicators, which reproduces the training encoding exactly.

use crate::error::{CoursecastError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fitted indicator encoder.
///
/// Category order within a column is first-observation order over the
/// training data, so the reference level (the dropped first category) is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorEncoder {
    columns: Vec<String>,
    categories: BTreeMap<String, Vec<String>>,
}

impl IndicatorEncoder {
    /// Learn the category vocabulary of each configured column.
    ///
    /// A configured column absent from the data gets an empty vocabulary and
    /// contributes no indicators.
    pub fn fit(df: &DataFrame, columns: &[String]) -> Result<Self> {
        let mut categories = BTreeMap::new();
        for col_name in columns {
            let vocab = match df.column(col_name) {
                Ok(col) => observed_categories(col.as_materialized_series())?,
                Err(_) => Vec::new(),
            };
            categories.insert(col_name.clone(), vocab);
        }
        Ok(Self {
            columns: columns.to_vec(),
            categories,
        })
    }

    /// Replace each encoded column with drop-first indicator columns.
    ///
    /// Every category after the first in the fitted vocabulary becomes a
    /// `{column}_{category}` column of 0.0/1.0. Values outside the vocabulary
    /// (including null) light no indicator.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();

        for col_name in &self.columns {
            let vocab = self
                .categories
                .get(col_name)
                .ok_or_else(|| CoursecastError::FeatureNotFound(col_name.clone()))?;

            if let Ok(col) = df.column(col_name) {
                let values: Vec<Option<String>> = col
                    .as_materialized_series()
                    .str()
                    .map(|ca| {
                        ca.into_iter()
                            .map(|v| v.map(|s| s.to_string()))
                            .collect()
                    })
                    .unwrap_or_else(|_| vec![None; df.height()]);

                for category in vocab.iter().skip(1) {
                    let indicator = indicator_series(col_name, category, &values);
                    result = result.with_column(indicator)?.clone();
                }
                result = result.drop(col_name)?;
            }
        }

        Ok(result)
    }

    /// Names of the indicator columns `transform` emits, in emission order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for col_name in &self.columns {
            if let Some(vocab) = self.categories.get(col_name) {
                for category in vocab.iter().skip(1) {
                    names.push(format!("{col_name}_{category}"));
                }
            }
        }
        names
    }
}

/// Expand categorical columns into indicators for every observed value.
///
/// The serve-path counterpart of [`IndicatorEncoder::transform`]: no fitted
/// vocabulary, no reference-level drop. Alignment against the frozen feature
/// list downstream keeps exactly the indicators training produced.
pub fn expand_observed(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    let mut result = df.clone();

    for col_name in columns {
        if let Ok(col) = df.column(col_name) {
            let values: Vec<Option<String>> = col
                .as_materialized_series()
                .str()
                .map(|ca| {
                    ca.into_iter()
                        .map(|v| v.map(|s| s.to_string()))
                        .collect()
                })
                .unwrap_or_else(|_| vec![None; df.height()]);

            let mut observed = Vec::new();
            for v in values.iter().flatten() {
                if !observed.iter().any(|o| o == v) {
                    observed.push(v.clone());
                }
            }

            for category in &observed {
                let indicator = indicator_series(col_name, category, &values);
                result = result.with_column(indicator)?.clone();
            }
            result = result.drop(col_name)?;
        }
    }

    Ok(result)
}

fn indicator_series(column: &str, category: &str, values: &[Option<String>]) -> Series {
    let name = format!("{column}_{category}");
    let flags: Vec<f64> = values
        .iter()
        .map(|v| match v {
            Some(s) if s == category => 1.0,
            _ => 0.0,
        })
        .collect();
    Series::new(name.as_str().into(), flags)
}

/// Distinct non-null values in first-observation order.
fn observed_categories(series: &Series) -> Result<Vec<String>> {
    let ca = match series.str() {
        Ok(ca) => ca,
        Err(_) => return Ok(Vec::new()),
    };
    let mut seen = Vec::new();
    for v in ca.into_iter().flatten() {
        if !seen.iter().any(|s| s == v) {
            seen.push(v.to_string());
        }
    }
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fit_transform_drops_first_category() {
        let df = df!(
            "continent" => &["Asia", "Europe", "Africa", "Europe"],
            "age" => &[20.0, 30.0, 40.0, 50.0],
        )
        .unwrap();

        let encoder = IndicatorEncoder::fit(&df, &cols(&["continent"])).unwrap();
        let encoded = encoder.transform(&df).unwrap();

        // "Asia" seen first, so it is the reference level
        assert!(encoded.column("continent_Asia").is_err());
        assert!(encoded.column("continent").is_err());

        let europe = encoded.column("continent_Europe").unwrap().f64().unwrap();
        assert_eq!(europe.get(0), Some(0.0));
        assert_eq!(europe.get(1), Some(1.0));
        assert_eq!(europe.get(3), Some(1.0));

        let africa = encoded.column("continent_Africa").unwrap().f64().unwrap();
        assert_eq!(africa.get(2), Some(1.0));

        // untouched passenger column
        assert!(encoded.column("age").is_ok());
    }

    #[test]
    fn test_feature_names_match_transform_output() {
        let df = df!(
            "device" => &["phone", "laptop", "tablet"],
        )
        .unwrap();

        let encoder = IndicatorEncoder::fit(&df, &cols(&["device"])).unwrap();
        assert_eq!(
            encoder.feature_names(),
            vec!["device_laptop".to_string(), "device_tablet".to_string()]
        );
    }

    #[test]
    fn test_transform_unseen_value_lights_no_indicator() {
        let train = df!("device" => &["phone", "laptop"]).unwrap();
        let encoder = IndicatorEncoder::fit(&train, &cols(&["device"])).unwrap();

        let input = df!("device" => &["desktop"]).unwrap();
        let encoded = encoder.transform(&input).unwrap();

        let laptop = encoded.column("device_laptop").unwrap().f64().unwrap();
        assert_eq!(laptop.get(0), Some(0.0));
    }

    #[test]
    fn test_expand_observed_emits_all_values() {
        let df = df!("device" => &["phone", "laptop", "phone"]).unwrap();
        let expanded = expand_observed(&df, &cols(&["device"])).unwrap();

        let phone = expanded.column("device_phone").unwrap().f64().unwrap();
        assert_eq!(phone.get(0), Some(1.0));
        assert_eq!(phone.get(1), Some(0.0));
        assert_eq!(phone.get(2), Some(1.0));

        let laptop = expanded.column("device_laptop").unwrap().f64().unwrap();
        assert_eq!(laptop.get(1), Some(1.0));

        assert!(expanded.column("device").is_err());
    }

    #[test]
    fn test_expand_observed_skips_absent_column() {
        let df = df!("age" => &[20.0]).unwrap();
        let expanded = expand_observed(&df, &cols(&["device"])).unwrap();
        assert_eq!(expanded.width(), 1);
    }

    #[test]
    fn test_roundtrip_serialization() {
        let df = df!("device" => &["phone", "laptop"]).unwrap();
        let encoder = IndicatorEncoder::fit(&df, &cols(&["device"])).unwrap();
        let json = serde_json::to_string(&encoder).unwrap();
        let restored: IndicatorEncoder = serde_json::from_str(&json).unwrap();
        assert_eq!(encoder, restored);
    }
}
