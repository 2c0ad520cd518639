use std::path::Path;

use tracing::{debug, info};

use crate::{
    inference::{
        classifier::{Classifier, LogisticModel},
        errors::InferenceError,
        preprocessor::{ColumnTransformer, Preprocessor},
    },
    models::{patient::PatientRecord, prediction::Prediction},
};

/// The loaded preprocessing + classification pipeline.
///
/// Built once after the artifacts are provisioned and handed to whoever needs
/// to score records.
pub struct ReadmissionPredictor {
    preprocessor: Box<dyn Preprocessor>,
    classifier: Box<dyn Classifier>,
    threshold: f64,
}

impl ReadmissionPredictor {
    pub fn new(
        preprocessor: Box<dyn Preprocessor>,
        classifier: Box<dyn Classifier>,
        threshold: f64,
    ) -> Self {
        Self {
            preprocessor,
            classifier,
            threshold,
        }
    }

    pub fn load(
        preprocessor_path: &Path,
        model_path: &Path,
        threshold: f64,
    ) -> Result<Self, InferenceError> {
        info!("Loading preprocessor from {:?}", preprocessor_path);
        let preprocessor = ColumnTransformer::load(preprocessor_path)?;
        info!("Loading model from {:?}", model_path);
        let classifier = LogisticModel::load(model_path)?;

        if preprocessor.output_width() != classifier.coefficients.len() {
            return Err(InferenceError::DimensionMismatch {
                expected: classifier.coefficients.len(),
                found: preprocessor.output_width(),
            });
        }

        Ok(Self::new(
            Box::new(preprocessor),
            Box::new(classifier),
            threshold,
        ))
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn predict(&self, record: &PatientRecord) -> Result<Prediction, InferenceError> {
        let row = record.to_row();
        let features = self.preprocessor.transform(&row)?;
        debug!("Transformed record into {} features", features.len());

        let probability = self.classifier.predict_proba(&features)?;
        debug!("Positive class probability {:.4}", probability);

        Ok(Prediction::new(probability, self.threshold))
    }
}
