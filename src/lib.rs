//! Coursecast - course-completion prediction
//!
//! Predicts whether a student will complete an online course from tabular
//! behavioral and demographic features. The crate is organized around one
//! contract: the feature transformation applied at training time is replayed
//! exactly at inference time.
//!
//! # Modules
//!
//! ## Core pipeline
//! - [`features`] - derived feature engineering (BMI, engagement score)
//! - [`preprocessing`] - imputation defaults, indicator encoding, column
//!   alignment, standard scaling
//!
//! ## Training and serving
//! - [`training`] - candidate classifiers and the training engine
//! - [`bundle`] - versioned model bundle persistence
//! - [`inference`] - record parsing and the inference engine
//!
//! ## Services
//! - [`cli`] - command-line interface (train / predict / schema)

pub mod error;

// Core pipeline
pub mod features;
pub mod preprocessing;

// Training and serving
pub mod training;
pub mod bundle;
pub mod inference;

// Services
pub mod cli;

pub use error::{CoursecastError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{CoursecastError, Result};

    pub use crate::preprocessing::{
        FeaturePipeline, PipelineConfig, PrepDefaults, StandardScaler,
    };

    pub use crate::training::{
        ClassificationReport, TrainedClassifier, Trainer, TrainerConfig,
    };

    pub use crate::bundle::{BundleManifest, ModelBundle};

    pub use crate::inference::{
        FieldValue, InferenceEngine, PredictInput, Record, SchemaInfo,
    };
}
