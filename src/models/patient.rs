use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::utils::{dir::DirUtils, errors::ResultWithError};

/// A value the record supplies for one column.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    /// `None` when the value is absent or could not be parsed as a number.
    Numeric(Option<f64>),
    Categorical(Option<String>),
}

/// A record flattened to `(column, value)` pairs in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    values: Vec<(&'static str, FeatureValue)>,
}

impl FeatureRow {
    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.values
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }
}

/// Numeric column input. Accepts numbers or numeric strings; anything else
/// coerces to NaN instead of failing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Numeric(pub f64);

impl Numeric {
    pub fn coerce(raw: &str) -> f64 {
        raw.trim().parse::<f64>().unwrap_or(f64::NAN)
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
            Flag(bool),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Numeric(value),
            Raw::Text(text) => Numeric(Self::coerce(&text)),
            Raw::Flag(_) => Numeric(f64::NAN),
        })
    }
}

/// Categorical column input. YAML scalars such as `428` or `250.01` are kept
/// as their textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text(pub String);

impl<'de> Deserialize<'de> for Text {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(i64),
            Float(f64),
            Flag(bool),
        }

        Ok(Text(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text,
            Raw::Integer(value) => value.to_string(),
            Raw::Float(value) => value.to_string(),
            Raw::Flag(value) => value.to_string(),
        }))
    }
}

trait IntoFeature {
    fn to_feature(&self) -> FeatureValue;
}

impl IntoFeature for Option<Numeric> {
    fn to_feature(&self) -> FeatureValue {
        FeatureValue::Numeric(self.map(|n| n.0).filter(|v| !v.is_nan()))
    }
}

impl IntoFeature for Option<Text> {
    fn to_feature(&self) -> FeatureValue {
        FeatureValue::Categorical(self.as_ref().map(|t| t.0.clone()))
    }
}

macro_rules! patient_record {
    ($($field:ident: $kind:ty => $column:literal,)*) => {
        /// One patient encounter, keyed by the column names the preprocessor
        /// was fitted on. Every column is optional; absent values are missing.
        #[derive(Debug, Clone, Default, PartialEq, Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct PatientRecord {
            $(
                #[serde(rename = $column, default)]
                pub $field: Option<$kind>,
            )*
        }

        impl PatientRecord {
            pub const COLUMNS: &'static [&'static str] = &[$($column),*];

            pub fn to_row(&self) -> FeatureRow {
                FeatureRow {
                    values: vec![$(($column, self.$field.to_feature())),*],
                }
            }
        }
    };
}

patient_record! {
    race: Text => "race",
    gender: Text => "gender",
    age: Text => "age",
    time_in_hospital: Numeric => "time_in_hospital",
    medical_specialty: Text => "medical_specialty",
    num_lab_procedures: Numeric => "num_lab_procedures",
    num_procedures: Numeric => "num_procedures",
    num_medications: Numeric => "num_medications",
    number_outpatient: Numeric => "number_outpatient",
    number_emergency: Numeric => "number_emergency",
    number_inpatient: Numeric => "number_inpatient",
    diag_1: Text => "diag_1",
    diag_2: Text => "diag_2",
    diag_3: Text => "diag_3",
    number_diagnoses: Numeric => "number_diagnoses",
    max_glu_serum: Text => "max_glu_serum",
    a1c_result: Text => "A1Cresult",
    metformin: Text => "metformin",
    repaglinide: Text => "repaglinide",
    nateglinide: Text => "nateglinide",
    chlorpropamide: Text => "chlorpropamide",
    glimepiride: Text => "glimepiride",
    acetohexamide: Text => "acetohexamide",
    glipizide: Text => "glipizide",
    glyburide: Text => "glyburide",
    tolbutamide: Text => "tolbutamide",
    pioglitazone: Text => "pioglitazone",
    rosiglitazone: Text => "rosiglitazone",
    acarbose: Text => "acarbose",
    miglitol: Text => "miglitol",
    troglitazone: Text => "troglitazone",
    tolazamide: Text => "tolazamide",
    examide: Text => "examide",
    citoglipton: Text => "citoglipton",
    insulin: Text => "insulin",
    glyburide_metformin: Text => "glyburide-metformin",
    glipizide_metformin: Text => "glipizide-metformin",
    glimepiride_pioglitazone: Text => "glimepiride-pioglitazone",
    metformin_rosiglitazone: Text => "metformin-rosiglitazone",
    metformin_pioglitazone: Text => "metformin-pioglitazone",
    change: Text => "change",
    diabetes_med: Text => "diabetesMed",
    admission_type_description: Text => "admission_type_description",
    discharge_disposition_description: Text => "discharge_disposition_description",
    admission_source_description: Text => "admission_source_description",
}

impl PatientRecord {
    pub fn from_file(path: &Path) -> ResultWithError<Self> {
        DirUtils::parse_yaml(path)
    }
}
