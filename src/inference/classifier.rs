use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::inference::{errors::InferenceError, preprocessor::load_json};

/// A binary classifier returning the probability of the positive class.
pub trait Classifier {
    fn predict_proba(&self, features: &[f64]) -> Result<f64, InferenceError>;
}

/// Logistic regression over the preprocessor's output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub intercept: f64,
    #[serde(default)]
    pub coefficients: Vec<f64>,
}

impl LogisticModel {
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        load_json(path)
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }
}

impl Classifier for LogisticModel {
    fn predict_proba(&self, features: &[f64]) -> Result<f64, InferenceError> {
        if features.len() != self.coefficients.len() {
            return Err(InferenceError::DimensionMismatch {
                expected: self.coefficients.len(),
                found: features.len(),
            });
        }

        let z = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>();

        let probability = Self::sigmoid(z);
        if probability.is_nan() {
            return Err(InferenceError::InvalidProbability(probability));
        }
        Ok(probability)
    }
}
