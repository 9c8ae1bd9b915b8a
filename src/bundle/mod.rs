//! Versioned model bundle persistence
//!
//! One training run produces one bundle directory holding five JSON
//! artifacts: `manifest.json`, the classifier file the manifest names,
//! `scaler.json`, `features.json`, and `prep.json`. The bundle is written
//! atomically (staging directory, then rename) and loaded read-only.

use crate::error::{CoursecastError, Result};
use crate::preprocessing::{FeaturePipeline, PrepDefaults, StandardScaler};
use crate::training::TrainedClassifier;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const FEATURES_FILE: &str = "features.json";
pub const PREP_FILE: &str = "prep.json";

const FORMAT_VERSION: u32 = 1;

/// Bundle metadata; names the classifier artifact so loading never scans
/// the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleManifest {
    pub format_version: u32,
    pub classifier_name: String,
    pub classifier_file: String,
    pub validation_accuracy: f64,
    pub created_at: DateTime<Utc>,
}

/// A fitted classifier together with the feature pipeline that feeds it.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    manifest: BundleManifest,
    classifier: TrainedClassifier,
    pipeline: FeaturePipeline,
}

impl ModelBundle {
    pub fn new(
        classifier: TrainedClassifier,
        pipeline: FeaturePipeline,
        validation_accuracy: f64,
    ) -> Self {
        let manifest = BundleManifest {
            format_version: FORMAT_VERSION,
            classifier_name: classifier.name().to_string(),
            classifier_file: format!("{}.json", classifier.name()),
            validation_accuracy,
            created_at: Utc::now(),
        };
        Self {
            manifest,
            classifier,
            pipeline,
        }
    }

    pub fn manifest(&self) -> &BundleManifest {
        &self.manifest
    }

    pub fn classifier(&self) -> &TrainedClassifier {
        &self.classifier
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    /// Write all artifacts atomically: everything lands in a staging
    /// directory that is renamed over the destination only once complete.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let parent = dir.parent().unwrap_or_else(|| Path::new("."));
        let stem = dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                CoursecastError::InvalidInput(format!("invalid bundle path: {}", dir.display()))
            })?;
        let staging = parent.join(format!(".{stem}.staging"));

        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        write_json(&staging.join(MANIFEST_FILE), &self.manifest)?;
        write_json(&staging.join(&self.manifest.classifier_file), &self.classifier)?;
        write_json(&staging.join(SCALER_FILE), self.pipeline.scaler())?;
        write_json(&staging.join(FEATURES_FILE), &self.pipeline.feature_names())?;
        write_json(&staging.join(PREP_FILE), self.pipeline.defaults())?;

        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        fs::rename(&staging, dir)?;

        info!(
            bundle = %dir.display(),
            classifier = %self.manifest.classifier_name,
            "bundle saved"
        );
        Ok(())
    }

    /// Load a bundle; any missing artifact is fatal.
    pub fn load(dir: &Path) -> Result<Self> {
        let manifest: BundleManifest = read_json(dir, MANIFEST_FILE)?;
        let classifier: TrainedClassifier = read_json(dir, &manifest.classifier_file)?;
        let defaults: PrepDefaults = read_json(dir, PREP_FILE)?;
        let feature_names: Vec<String> = read_json(dir, FEATURES_FILE)?;
        let scaler: StandardScaler = read_json(dir, SCALER_FILE)?;

        let pipeline = FeaturePipeline::from_parts(defaults, feature_names, scaler)?;

        info!(
            bundle = %dir.display(),
            classifier = %manifest.classifier_name,
            accuracy = manifest.validation_accuracy,
            "bundle loaded"
        );
        Ok(Self {
            manifest,
            classifier,
            pipeline,
        })
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T> {
    let path = dir.join(name);
    let file = File::open(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CoursecastError::MissingArtifact(name.to_string())
        } else {
            CoursecastError::IoError(e)
        }
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
