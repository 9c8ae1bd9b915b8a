//! Online inference: raw record parsing and the serving engine

mod engine;
mod record;

pub use engine::{InferenceEngine, SchemaInfo};
pub use record::{records_to_frame, FieldValue, PredictInput, Record};
