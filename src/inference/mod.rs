pub mod classifier;
pub mod errors;
pub mod predictor;
pub mod preprocessor;
