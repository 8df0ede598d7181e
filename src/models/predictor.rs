//! Black-box prediction over a loaded model artifact.

use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::domain::{FeatureVector, PredictionRequest, PredictionResult};
use crate::error::AppError;
use crate::io::model_file::{parse_model_artifact, read_model_artifact};
use crate::models::{ModelArtifact, RegressionModel};

/// A validated model, ready to answer prediction requests.
///
/// Immutable after construction.
#[derive(Debug, Clone)]
pub struct Predictor {
    n_features: usize,
    model: RegressionModel,
}

impl Predictor {
    /// Load and validate a model artifact from disk.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let predictor = Self::from_artifact(read_model_artifact(path)?)?;
        info!(path = %path.display(), model = %predictor.describe(), "loaded model artifact");
        Ok(predictor)
    }

    pub fn from_reader<R: Read>(source: R) -> Result<Self, AppError> {
        Self::from_artifact(parse_model_artifact(source)?)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, AppError> {
        artifact
            .validate()
            .map_err(|e| AppError::model_load(format!("Incompatible model artifact: {e}")))?;
        Ok(Self {
            n_features: artifact.n_features,
            model: artifact.model,
        })
    }

    pub fn describe(&self) -> String {
        format!("{} ({} features)", self.model.display_name(), self.n_features)
    }

    /// Predict traffic for one request.
    ///
    /// Inputs are not range-checked; out-of-range values are passed through.
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, AppError> {
        let features = FeatureVector::from(request);
        let result = self.predict_features(&features)?;
        debug!(?request, value = result.value, "prediction");
        Ok(result)
    }

    pub fn predict_features(&self, features: &FeatureVector) -> Result<PredictionResult, AppError> {
        let x = features.as_slice();
        if x.len() != self.n_features {
            return Err(AppError::prediction(format!(
                "Model expects {} features but received {} ({}).",
                self.n_features,
                x.len(),
                FeatureVector::NAMES.join(", ")
            )));
        }

        let value = self.model.predict(x);
        if !value.is_finite() {
            return Err(AppError::prediction("Model produced a non-finite prediction."));
        }
        Ok(PredictionResult { value })
    }

    /// Predictions for every hour of the request's day, other fields fixed.
    pub fn predict_hourly_profile(&self, request: &PredictionRequest) -> Result<Vec<(u32, f64)>, AppError> {
        (0..24u32)
            .map(|hour| {
                self.predict_features(&FeatureVector::from(&request.with_hour(hour)))
                    .map(|r| (hour, r.value))
            })
            .collect()
    }
}
