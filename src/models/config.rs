use std::{
    fs,
    path::{Path, PathBuf},
};

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use crate::{
    models::artifact::{ArtifactSpec, SourceDescriptor},
    utils::{
        dir::DirUtils,
        downloader_def::downloader::{INDIRECT_CHUNK_SIZE, URL_CHUNK_SIZE},
        errors::{ResultTrait, ResultWithError},
        variables::VariablesUtils,
    },
};

pub const CONFIG_FILE_NAME: &str = "readmit.yaml";
pub const DEFAULT_MODEL_PATH: &str = "model.json";
pub const DEFAULT_PREPROCESSOR_PATH: &str = "preprocessor.json";
pub const DEFAULT_INDIRECT_ENDPOINT: &str = "https://docs.google.com/uc?export=download";
pub const DEFAULT_THRESHOLD: f64 = 0.1174;

/// Configuration structure for the readmission predictor.
#[derive(Debug, Default, Deserialize, Clone, JsonSchema)]
#[serde(default)]
pub struct Config {
    pub artifacts: ArtifactsConfig,
    pub download: DownloadConfig,
    pub prediction: PredictionConfig,
}

impl Config {
    /// Loads `path`, or `readmit.yaml` from the current directory when no path
    /// is given. Only an explicitly requested file has to exist.
    pub fn load(path: Option<&Path>) -> ResultWithError<Self> {
        let (config_path, required) = match path {
            Some(path) => (DirUtils::absolute(path)?, true),
            None => (DirUtils::curr_dir()?.join(CONFIG_FILE_NAME), false),
        };

        let content = if config_path.exists() {
            debug!("Loading config from {:?}", config_path);
            fs::read_to_string(&config_path).auto_err("Could not read config file")?
        } else if required {
            return Err(format!("Config file {:?} does not exist", config_path).into());
        } else {
            debug!("No config file at {:?}, using defaults", config_path);
            String::new()
        };

        let expanded = VariablesUtils::expand_env_vars(&content);
        Self::from_yaml(&expanded, VariablesUtils::non_blank_env)
    }

    /// Parses an already expanded YAML document and applies the environment
    /// overrides resolved through `lookup`.
    pub fn from_yaml<F>(content: &str, lookup: F) -> ResultWithError<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content).auto_err("Invalid config format")?
        };
        debug!("Config deserialized");

        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides = [
            ("MODEL_URL", &mut self.artifacts.model.url),
            ("MODEL_SOURCE_ID", &mut self.artifacts.model.source_id),
            ("PREPROCESSOR_URL", &mut self.artifacts.preprocessor.url),
            ("PREPROCESSOR_SOURCE_ID", &mut self.artifacts.preprocessor.source_id),
        ];

        for (key, slot) in overrides {
            if let Some(value) = lookup(key) {
                debug!("{} set from environment", key);
                *slot = Some(value);
            }
        }
    }

    fn validate(&self) -> ResultWithError<()> {
        let threshold = self.prediction.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(
                format!("prediction.threshold must be within [0, 1], got {threshold}").into(),
            );
        }
        if self.download.url_chunk_size == 0 || self.download.indirect_chunk_size == 0 {
            return Err("download chunk sizes must be greater than zero".into());
        }
        Ok(())
    }

    /// The model and preprocessor specs, in that order.
    pub fn artifact_specs(&self) -> Vec<ArtifactSpec> {
        let endpoint = &self.download.indirect_endpoint;
        vec![
            self.artifacts
                .model
                .to_spec("model", DEFAULT_MODEL_PATH, endpoint),
            self.artifacts
                .preprocessor
                .to_spec("preprocessor", DEFAULT_PREPROCESSOR_PATH, endpoint),
        ]
    }

    pub fn model_path(&self) -> PathBuf {
        self.artifacts.model.path_or(DEFAULT_MODEL_PATH)
    }

    pub fn preprocessor_path(&self) -> PathBuf {
        self.artifacts.preprocessor.path_or(DEFAULT_PREPROCESSOR_PATH)
    }
}

#[derive(Debug, Default, Deserialize, Clone, JsonSchema)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub model: ArtifactConfig,
    pub preprocessor: ArtifactConfig,
}

#[derive(Debug, Default, Deserialize, Clone, JsonSchema)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Local path of the artifact, relative to the working directory
    pub path: Option<PathBuf>,
    /// Direct download URL, tried first
    pub url: Option<String>,
    /// Id understood by the indirect download provider, tried after `url`
    pub source_id: Option<String>,
}

impl ArtifactConfig {
    fn path_or(&self, default: &str) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from(default))
    }

    fn to_spec(&self, name: &str, default_path: &str, endpoint: &str) -> ArtifactSpec {
        let direct = self
            .url
            .iter()
            .map(|url| SourceDescriptor::DirectUrl { url: url.clone() });
        let indirect = self.source_id.iter().map(|file_id| SourceDescriptor::IndirectId {
            provider_endpoint: endpoint.to_owned(),
            file_id: file_id.clone(),
        });

        ArtifactSpec::new(name, self.path_or(default_path), direct.chain(indirect).collect())
    }
}

#[derive(Debug, Deserialize, Clone, JsonSchema)]
#[serde(default)]
pub struct DownloadConfig {
    /// Endpoint of the indirect id-based download provider
    pub indirect_endpoint: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Extra attempts after a transient failure
    pub retries: u32,
    /// First retry delay; doubles on each further attempt
    pub retry_backoff_ms: u64,
    pub url_chunk_size: usize,
    pub indirect_chunk_size: usize,
    /// Draw a progress bar while downloading
    pub progress: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            indirect_endpoint: DEFAULT_INDIRECT_ENDPOINT.to_owned(),
            timeout_secs: 300,
            connect_timeout_secs: 30,
            retries: 0,
            retry_backoff_ms: 500,
            url_chunk_size: URL_CHUNK_SIZE,
            indirect_chunk_size: INDIRECT_CHUNK_SIZE,
            progress: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, JsonSchema)]
#[serde(default)]
pub struct PredictionConfig {
    /// Probability at or above which a patient is flagged high risk
    pub threshold: f64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}
