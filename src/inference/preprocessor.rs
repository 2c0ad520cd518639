use std::{fs, path::Path};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    inference::errors::InferenceError,
    models::patient::{FeatureRow, FeatureValue, PatientRecord},
};

/// Turns a record into the numeric vector a classifier consumes.
pub trait Preprocessor {
    fn transform(&self, row: &FeatureRow) -> Result<Vec<f64>, InferenceError>;
    fn output_width(&self) -> usize;
}

/// Reads a JSON artifact from disk.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, InferenceError> {
    let content = fs::read(path).map_err(|source| InferenceError::ArtifactRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&content).map_err(|source| InferenceError::ArtifactParse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaledColumn {
    pub column: String,
    #[serde(default)]
    pub mean: f64,
    #[serde(default = "ScaledColumn::unit")]
    pub scale: f64,
    /// Value used when the record has nothing usable for this column.
    #[serde(default)]
    pub impute: f64,
}

impl ScaledColumn {
    fn unit() -> f64 {
        1.0
    }

    fn encode(&self, value: Option<f64>) -> f64 {
        let scale = if self.scale == 0.0 { 1.0 } else { self.scale };
        (value.unwrap_or(self.impute) - self.mean) / scale
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotColumn {
    pub column: String,
    pub categories: Vec<String>,
}

impl OneHotColumn {
    /// Unknown or missing categories encode as all zeros.
    fn encode(&self, value: Option<&str>, out: &mut Vec<f64>) {
        out.extend(
            self.categories
                .iter()
                .map(|category| f64::from(value == Some(category.as_str()))),
        );
    }
}

/// Standard-scales numeric columns, then one-hot encodes categorical ones.
/// Output layout: every numeric column in order, followed by the categories
/// of each categorical column in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnTransformer {
    #[serde(default)]
    pub numeric: Vec<ScaledColumn>,
    #[serde(default)]
    pub categorical: Vec<OneHotColumn>,
}

impl ColumnTransformer {
    /// Loads the artifact and checks every column it names exists on a record.
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let transformer: Self = load_json(path)?;
        let columns = transformer
            .numeric
            .iter()
            .map(|spec| &spec.column)
            .chain(transformer.categorical.iter().map(|spec| &spec.column));

        for column in columns {
            if !PatientRecord::COLUMNS.contains(&column.as_str()) {
                return Err(InferenceError::MissingColumn(column.clone()));
            }
        }
        Ok(transformer)
    }

    fn value<'a>(row: &'a FeatureRow, column: &str) -> Result<&'a FeatureValue, InferenceError> {
        row.get(column)
            .ok_or_else(|| InferenceError::MissingColumn(column.to_owned()))
    }
}

impl Preprocessor for ColumnTransformer {
    fn transform(&self, row: &FeatureRow) -> Result<Vec<f64>, InferenceError> {
        let mut out = Vec::with_capacity(self.output_width());

        for spec in &self.numeric {
            match Self::value(row, &spec.column)? {
                FeatureValue::Numeric(value) => out.push(spec.encode(*value)),
                FeatureValue::Categorical(_) => {
                    return Err(InferenceError::ColumnKind {
                        column: spec.column.clone(),
                        expected: "numeric",
                        found: "categorical",
                    });
                }
            }
        }

        for spec in &self.categorical {
            match Self::value(row, &spec.column)? {
                FeatureValue::Categorical(value) => spec.encode(value.as_deref(), &mut out),
                FeatureValue::Numeric(_) => {
                    return Err(InferenceError::ColumnKind {
                        column: spec.column.clone(),
                        expected: "categorical",
                        found: "numeric",
                    });
                }
            }
        }

        Ok(out)
    }

    fn output_width(&self) -> usize {
        self.numeric.len()
            + self
                .categorical
                .iter()
                .map(|column| column.categories.len())
                .sum::<usize>()
    }
}
