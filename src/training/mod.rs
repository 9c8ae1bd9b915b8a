//! Offline training: candidate classifiers and the training engine
//!
//! Three native classifier implementations compete on a held-out split and
//! the best one by accuracy ships in the bundle. All of them consume the
//! scaled matrix produced by [`crate::preprocessing::FeaturePipeline`].

mod decision_tree;
mod engine;
mod gradient_boosting;
mod linear;
mod models;
mod random_forest;

pub use decision_tree::{Criterion, DecisionTree};
pub use engine::{Trainer, TrainerConfig};
pub use gradient_boosting::{GradientBoostingClassifier, GradientBoostingConfig};
pub use linear::LogisticRegression;
pub use models::{ClassificationReport, TrainedClassifier};
pub use random_forest::{MaxFeatures, RandomForestClassifier};
