//! Raw request records and their DataFrame representation

use crate::error::{CoursecastError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One scalar field of a raw record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Str(String),
}

/// One student: field name → scalar. Any field may be absent.
pub type Record = BTreeMap<String, FieldValue>;

/// Request payload: a single record or a batch, handled through one path.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PredictInput {
    Single(Record),
    Batch(Vec<Record>),
}

impl PredictInput {
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Self::Single(record) => vec![record],
            Self::Batch(records) => records,
        }
    }
}

/// Build a DataFrame over the union of record keys.
///
/// A key absent from a record becomes a null in that row. A column holding
/// any string value must hold only strings; mixing strings and numbers in
/// one column is a malformed request.
pub fn records_to_frame(records: &[Record]) -> Result<DataFrame> {
    if records.is_empty() {
        return Err(CoursecastError::InvalidInput(
            "empty record set".to_string(),
        ));
    }

    let keys: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.keys().map(|k| k.as_str()))
        .collect();

    let mut columns: Vec<Column> = Vec::with_capacity(keys.len());
    for key in keys {
        let is_string = records
            .iter()
            .any(|r| matches!(r.get(key), Some(FieldValue::Str(_))));

        let series = if is_string {
            let values: Vec<Option<&str>> = records
                .iter()
                .map(|r| match r.get(key) {
                    None => Ok(None),
                    Some(FieldValue::Str(s)) => Ok(Some(s.as_str())),
                    Some(_) => Err(CoursecastError::InvalidInput(format!(
                        "field '{key}' mixes string and numeric values"
                    ))),
                })
                .collect::<Result<_>>()?;
            Series::new(key.into(), values)
        } else {
            let values: Vec<Option<f64>> = records
                .iter()
                .map(|r| match r.get(key) {
                    None => None,
                    Some(FieldValue::Int(v)) => Some(*v as f64),
                    Some(FieldValue::Float(v)) => Some(*v),
                    Some(FieldValue::Str(_)) => unreachable!(),
                })
                .collect();
            Series::new(key.into(), values)
        };
        columns.push(series.into());
    }

    Ok(DataFrame::new(columns)?)
}
