//! SmartCore random forest wrapper
//!
//! Loads a bincode artifact holding a trained `RandomForestRegressor` and the
//! encoder used at training time.

use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;

use super::{read_artifact, FeatureEncoder, ModelMetadata, Predictor, PredictorError};
use crate::forecast::FeatureRecord;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Serialized random forest pipeline
#[derive(Debug, Serialize, Deserialize)]
pub struct SmartcoreForest {
    pub metadata: ModelMetadata,
    pub preprocessor: FeatureEncoder,
    model: Forest,
}

impl SmartcoreForest {
    pub fn new(
        metadata: ModelMetadata,
        preprocessor: FeatureEncoder,
        model: Forest,
    ) -> Result<Self, PredictorError> {
        preprocessor.validate()?;
        Ok(Self {
            metadata,
            preprocessor,
            model,
        })
    }

    pub fn from_path(path: &str) -> Result<Self, PredictorError> {
        let bytes = read_artifact(path)?;
        let forest: Self =
            bincode::deserialize(&bytes).map_err(|e| PredictorError::Format(e.to_string()))?;
        forest.preprocessor.validate()?;
        Ok(forest)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, PredictorError> {
        bincode::serialize(self).map_err(|e| PredictorError::Format(e.to_string()))
    }
}

impl Predictor for SmartcoreForest {
    fn predict(&self, records: &[FeatureRecord]) -> Result<Vec<f64>, PredictorError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let n_features = self.preprocessor.width();
        let mut flat = Vec::with_capacity(records.len() * n_features);
        for record in records {
            flat.extend(self.preprocessor.encode(record));
        }

        let x = DenseMatrix::new(records.len(), n_features, flat, false);
        self.model
            .predict(&x)
            .map_err(|e| PredictorError::Inference(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::encoding::fixtures::{encoder, record};
    use crate::ml::ModelType;
    use smartcore::ensemble::random_forest_regressor::RandomForestRegressorParameters;

    fn train() -> SmartcoreForest {
        let enc = encoder();
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let mut r = record();
            r.lag_1 = i as f64 * 100.0;
            x.extend(enc.encode(&r));
            y.push(i as f64 * 100.0);
        }
        let matrix = DenseMatrix::new(40, enc.width(), x, false);
        let params = RandomForestRegressorParameters {
            max_depth: Some(6),
            min_samples_leaf: 1,
            min_samples_split: 2,
            n_trees: 10,
            m: None,
            keep_samples: false,
            seed: 42,
        };
        let model = RandomForestRegressor::fit(&matrix, &y, params).unwrap();
        let metadata = ModelMetadata {
            model_id: "test_forest".to_string(),
            model_type: ModelType::RandomForest,
            version: "0.1.0".to_string(),
            trained_at: None,
            training_samples: 40,
        };
        SmartcoreForest::new(metadata, enc, model).unwrap()
    }

    #[test]
    fn test_forest_predicts_one_value_per_record() {
        let forest = train();
        let preds = forest.predict(&[record(), record()]).unwrap();
        assert_eq!(preds.len(), 2);
        assert!(preds.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_forest_artifact_round_trip() {
        let forest = train();
        let bytes = forest.to_bytes().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.bin");
        std::fs::write(&path, bytes).unwrap();
        let loaded = SmartcoreForest::from_path(path.to_str().unwrap()).unwrap();
        assert_eq!(
            loaded.predict(&[record()]).unwrap(),
            forest.predict(&[record()]).unwrap()
        );
    }
}
