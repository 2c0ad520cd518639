use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("failed to read artifact {path:?}: {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path:?}: {source}")]
    ArtifactParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("column '{0}' is not part of the record")]
    MissingColumn(String),

    #[error("column '{column}' is {found}, expected {expected}")]
    ColumnKind {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("classifier expects {expected} features, preprocessor produced {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("classifier produced an invalid probability: {0}")]
    InvalidProbability(f64),
}
