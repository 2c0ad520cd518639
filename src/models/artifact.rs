use std::{fmt, path::PathBuf};

use crate::utils::downloader_def::errors::ProvisionError;

/// Where an artifact can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    DirectUrl {
        url: String,
    },
    IndirectId {
        provider_endpoint: String,
        file_id: String,
    },
}

impl SourceDescriptor {
    pub fn validate(&self) -> Result<(), ProvisionError> {
        match self {
            Self::DirectUrl { url } if url.trim().is_empty() => Err(
                ProvisionError::Configuration("direct url source has an empty url".into()),
            ),
            Self::IndirectId {
                provider_endpoint, ..
            } if provider_endpoint.trim().is_empty() => Err(ProvisionError::Configuration(
                "indirect source has an empty provider endpoint".into(),
            )),
            Self::IndirectId { file_id, .. } if file_id.trim().is_empty() => Err(
                ProvisionError::Configuration("indirect source has an empty file id".into()),
            ),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectUrl { url } => write!(f, "url {url}"),
            Self::IndirectId {
                provider_endpoint,
                file_id,
            } => write!(f, "id {file_id} via {provider_endpoint}"),
        }
    }
}

/// A file that must exist locally, and the ordered sources it can come from.
///
/// The first source is the primary one; the rest are only tried when every
/// earlier source failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub name: String,
    pub local_path: PathBuf,
    pub sources: Vec<SourceDescriptor>,
}

impl ArtifactSpec {
    /// A spec without sources is fine as long as the file already exists.
    pub fn new(
        name: impl Into<String>,
        local_path: impl Into<PathBuf>,
        sources: Vec<SourceDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            local_path: local_path.into(),
            sources,
        }
    }

    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.local_path.as_os_str().is_empty() {
            return Err(ProvisionError::Configuration(format!(
                "artifact '{}' has an empty local path",
                self.name
            )));
        }
        if self.sources.is_empty() {
            return Err(ProvisionError::Configuration(format!(
                "artifact '{}' is missing at {:?} and has no source configured",
                self.name, self.local_path
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success,
    Failed(ProvisionError),
}

/// Result of provisioning one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub artifact: ArtifactSpec,
    pub status: OutcomeStatus,
    pub bytes_written: u64,
    /// The source the file came from; `None` if it was already present or
    /// nothing could be fetched.
    pub source: Option<SourceDescriptor>,
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    pub fn error(&self) -> Option<&ProvisionError> {
        match &self.status {
            OutcomeStatus::Failed(err) => Some(err),
            OutcomeStatus::Success => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionResult {
    pub all_succeeded: bool,
    pub outcomes: Vec<DownloadOutcome>,
}

impl ProvisionResult {
    pub fn from_outcomes(outcomes: Vec<DownloadOutcome>) -> Self {
        Self {
            all_succeeded: outcomes.iter().all(DownloadOutcome::is_success),
            outcomes,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }
}
