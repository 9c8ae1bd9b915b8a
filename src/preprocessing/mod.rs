//! Preprocessing: the feature-transformation contract shared between
//! training and inference
//!
//! The stages, in order:
//! - derived features (see [`crate::features`])
//! - imputation defaults learned at training time ([`PrepDefaults`])
//! - indicator encoding of categorical columns ([`IndicatorEncoder`] when
//!   fitting, [`expand_observed`] when serving)
//! - alignment against the frozen feature name list ([`aligned_matrix`])
//! - standardization ([`StandardScaler`])
//!
//! [`FeaturePipeline`] ties the stages together so the serve path cannot
//! drift from the train path.

mod defaults;
mod encoder;
mod pipeline;
mod scaler;

pub use defaults::PrepDefaults;
pub use encoder::{expand_observed, IndicatorEncoder};
pub use pipeline::{aligned_matrix, FeaturePipeline, PipelineConfig};
pub use scaler::StandardScaler;
