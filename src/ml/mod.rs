//! Machine Learning Module
//!
//! Consumes already-trained traffic models. Training happens offline; this
//! module only loads serialized pipelines and runs inference:
//! - [`LinearPipeline`]: JSON artifact (scaler + one-hot encoder + coefficients)
//! - `SmartcoreForest` (feature `ml`): bincode artifact wrapping a SmartCore
//!   random forest regressor

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::ModelConfig;
use crate::forecast::FeatureRecord;

pub mod encoding;
pub mod pipeline;

#[cfg(feature = "ml")]
pub mod smartcore;

pub use encoding::*;
pub use pipeline::*;

/// ML Model Type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    LinearRegression,
    RandomForest,
}

/// Metadata stored alongside a serialized model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_id: String,
    pub model_type: ModelType,
    pub version: String,
    #[serde(default)]
    pub trained_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub training_samples: usize,
}

/// Errors from loading or calling a model
#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("Failed to read model file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid model artifact: {0}")]
    Format(String),

    #[error("Feature count mismatch: expected {expected}, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("Model returned {got} predictions for {expected} rows")]
    OutputMismatch { expected: usize, got: usize },

    #[error("Inference failed: {0}")]
    Inference(String),
}

/// A trained model: one predicted volume per feature record
#[cfg_attr(test, mockall::automock)]
pub trait Predictor: Send + Sync {
    fn predict(&self, records: &[FeatureRecord]) -> Result<Vec<f64>, PredictorError>;
}

/// Load the configured model artifact
pub fn load_predictor(cfg: &ModelConfig) -> Result<Arc<dyn Predictor>, PredictorError> {
    let predictor: Arc<dyn Predictor> = match cfg.kind {
        ModelType::LinearRegression => Arc::new(LinearPipeline::from_json_path(&cfg.path)?),
        #[cfg(feature = "ml")]
        ModelType::RandomForest => Arc::new(self::smartcore::SmartcoreForest::from_path(&cfg.path)?),
        #[cfg(not(feature = "ml"))]
        ModelType::RandomForest => {
            return Err(PredictorError::Format(
                "random_forest models require the `ml` feature".to_string(),
            ))
        }
    };
    info!(path = %cfg.path, kind = ?cfg.kind, "model loaded");
    Ok(predictor)
}

/// Read a whole artifact file, mapping I/O errors
pub(crate) fn read_artifact(path: &str) -> Result<Vec<u8>, PredictorError> {
    std::fs::read(path).map_err(|source| PredictorError::Io {
        path: path.to_string(),
        source,
    })
}
