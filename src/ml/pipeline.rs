use serde::{Deserialize, Serialize};

use super::{read_artifact, FeatureEncoder, ModelMetadata, Predictor, PredictorError};
use crate::forecast::FeatureRecord;

/// Linear regression pipeline exported as JSON
///
/// ```json
/// {
///   "metadata": {"model_id": "i94_linear", "model_type": "linear_regression", "version": "1"},
///   "preprocessor": {"scaler": null, "encoder": {"categories": [["Labor Day"], ["Clear"], ["sky is clear"]]}},
///   "coefficients": [...],
///   "intercept": 3260.0
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearPipeline {
    pub metadata: ModelMetadata,
    pub preprocessor: FeatureEncoder,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearPipeline {
    pub fn new(
        metadata: ModelMetadata,
        preprocessor: FeatureEncoder,
        coefficients: Vec<f64>,
        intercept: f64,
    ) -> Result<Self, PredictorError> {
        let pipeline = Self {
            metadata,
            preprocessor,
            coefficients,
            intercept,
        };
        pipeline.validate()?;
        Ok(pipeline)
    }

    pub fn from_json_path(path: &str) -> Result<Self, PredictorError> {
        let bytes = read_artifact(path)?;
        Self::from_json_slice(&bytes)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, PredictorError> {
        let pipeline: Self =
            serde_json::from_slice(bytes).map_err(|e| PredictorError::Format(e.to_string()))?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    fn validate(&self) -> Result<(), PredictorError> {
        self.preprocessor.validate()?;
        let expected = self.preprocessor.width();
        if self.coefficients.len() != expected {
            return Err(PredictorError::FeatureMismatch {
                expected,
                got: self.coefficients.len(),
            });
        }
        Ok(())
    }
}

impl Predictor for LinearPipeline {
    fn predict(&self, records: &[FeatureRecord]) -> Result<Vec<f64>, PredictorError> {
        records
            .iter()
            .map(|record| {
                let row = self.preprocessor.encode(record);
                if row.len() != self.coefficients.len() {
                    return Err(PredictorError::FeatureMismatch {
                        expected: self.coefficients.len(),
                        got: row.len(),
                    });
                }
                Ok(row
                    .iter()
                    .zip(self.coefficients.iter())
                    .map(|(f, c)| f * c)
                    .sum::<f64>()
                    + self.intercept)
            })
            .collect()
    }
}
