//! Feature encoding shared by the model artifacts
//!
//! Mirrors the preprocessing step of the training pipeline: numeric columns
//! optionally standardized, categorical columns one-hot encoded with unknown
//! categories ignored (all zeros).

use serde::{Deserialize, Serialize};

use super::PredictorError;
use crate::forecast::{FeatureRecord, CATEGORICAL_FEATURES, NUMERIC_FEATURES};

/// Z-score scaling parameters for the numeric columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn apply(&self, idx: usize, value: f64) -> f64 {
        let scale = self.scale[idx];
        if scale.abs() < 1e-10 {
            value - self.mean[idx]
        } else {
            (value - self.mean[idx]) / scale
        }
    }
}

/// One-hot categories, one list per categorical column
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    pub categories: Vec<Vec<String>>,
}

impl CategoricalEncoder {
    /// Width of the one-hot block
    pub fn width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }
}

/// Full preprocessing step: numeric block followed by one-hot block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureEncoder {
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    pub encoder: CategoricalEncoder,
}

impl FeatureEncoder {
    pub fn width(&self) -> usize {
        NUMERIC_FEATURES.len() + self.encoder.width()
    }

    pub fn validate(&self) -> Result<(), PredictorError> {
        if self.encoder.categories.len() != CATEGORICAL_FEATURES.len() {
            return Err(PredictorError::Format(format!(
                "expected {} categorical columns, got {}",
                CATEGORICAL_FEATURES.len(),
                self.encoder.categories.len()
            )));
        }
        if let Some(scaler) = &self.scaler {
            let n = NUMERIC_FEATURES.len();
            if scaler.mean.len() != n || scaler.scale.len() != n {
                return Err(PredictorError::Format(format!(
                    "scaler must have {} means and scales",
                    n
                )));
            }
        }
        Ok(())
    }

    /// Encode one record into a dense row
    pub fn encode(&self, record: &FeatureRecord) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.width());
        for (idx, value) in record.numeric_values().into_iter().enumerate() {
            row.push(match &self.scaler {
                Some(s) => s.apply(idx, value),
                None => value,
            });
        }
        for (categories, value) in self
            .encoder
            .categories
            .iter()
            .zip(record.categorical_values())
        {
            row.extend(
                categories
                    .iter()
                    .map(|c| if Some(c.as_str()) == value { 1.0 } else { 0.0 }),
            );
        }
        row
    }
}
