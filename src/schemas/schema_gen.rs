use std::{fs, path::Path};

use schemars::{JsonSchema, schema_for};
use tracing::info;

use crate::utils::errors::{EmptyResult, ResultWithError};

pub struct SchemaGen {}

impl SchemaGen {
    pub fn new() -> Self {
        Self {}
    }

    /// Writes the configuration schema to `output`, or stdout when `None`.
    pub fn execute(&self, output: Option<&Path>) -> EmptyResult {
        let schema = Self::render::<crate::models::config::Config>()?;

        match output {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, schema)?;
                info!("✅ Schema generated successfully at {}", path.display());
            }
            None => println!("{schema}"),
        }
        Ok(())
    }

    fn render<T>() -> ResultWithError<String>
    where
        T: JsonSchema,
    {
        let schema = schema_for!(T);
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::Config;

    #[test]
    fn config_schema_lists_sections() {
        let schema = SchemaGen::render::<Config>().unwrap();
        assert!(schema.contains("\"artifacts\""));
        assert!(schema.contains("\"download\""));
        assert!(schema.contains("\"threshold\""));
    }

    #[test]
    fn writes_schema_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generated").join("config.json");
        SchemaGen::new().execute(Some(path.as_path())).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("indirect_endpoint"));
    }
}
