//! The serving engine

use crate::bundle::ModelBundle;
use crate::error::Result;
use crate::inference::{records_to_frame, PredictInput};
use parking_lot::RwLock;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Introspection of the active bundle.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaInfo {
    pub feature_names: Vec<String>,
    pub classifier: String,
    pub validation_accuracy: f64,
}

/// Serves predictions from a loaded bundle.
///
/// The bundle is immutable and shared behind an `Arc`; `reload` swaps the
/// whole `Arc` at once, so a concurrent `predict` sees either the old
/// bundle or the new one, never a mix.
pub struct InferenceEngine {
    bundle: RwLock<Arc<ModelBundle>>,
}

impl InferenceEngine {
    /// Load a bundle from disk; any missing artifact is fatal.
    pub fn load(dir: &Path) -> Result<Self> {
        let bundle = ModelBundle::load(dir)?;
        Ok(Self {
            bundle: RwLock::new(Arc::new(bundle)),
        })
    }

    /// Hot-swap to a retrained bundle. The new bundle is fully constructed
    /// before the swap; on error the active bundle is untouched.
    pub fn reload(&self, dir: &Path) -> Result<()> {
        let bundle = Arc::new(ModelBundle::load(dir)?);
        *self.bundle.write() = bundle;
        info!(bundle = %dir.display(), "bundle swapped");
        Ok(())
    }

    /// Predict 0/1 completion labels, one per input record, in input order.
    pub fn predict(&self, input: PredictInput) -> Result<Vec<i64>> {
        let bundle = Arc::clone(&self.bundle.read());

        let records = input.into_records();
        let df = records_to_frame(&records)?;

        let matrix = bundle.pipeline().transform(&df)?;
        let predictions = bundle.classifier().predict(&matrix)?;

        Ok(predictions.iter().map(|p| p.round() as i64).collect())
    }

    pub fn schema(&self) -> SchemaInfo {
        let bundle = Arc::clone(&self.bundle.read());
        SchemaInfo {
            feature_names: bundle.pipeline().feature_names().to_vec(),
            classifier: bundle.manifest().classifier_name.clone(),
            validation_accuracy: bundle.manifest().validation_accuracy,
        }
    }
}
