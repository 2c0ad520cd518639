use std::{fs, path::Path, thread, time::Duration};

use tracing::{debug, error, info, warn};

use crate::{
    models::{
        artifact::{ArtifactSpec, DownloadOutcome, OutcomeStatus, ProvisionResult, SourceDescriptor},
        config::DownloadConfig,
    },
    utils::{
        dir::DirUtils,
        downloader_def::{
            downloader::DownloadOptions,
            errors::ProvisionError,
            providers::{direct_url::DirectUrlSourceProvider, indirect_id::IndirectIdSourceProvider},
            r#trait::{SourceProvider, StreamStats},
        },
    },
};

/// Bounded retry for transient failures. `retries == 0` means one attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 0,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    fn delay(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(1u32 << attempt.min(16))
    }
}

/// Makes sure a set of artifacts exists on disk, fetching the missing ones.
pub struct Provisioner {
    providers: Vec<Box<dyn SourceProvider>>,
    retry: RetryPolicy,
}

impl Provisioner {
    pub fn new(providers: Vec<Box<dyn SourceProvider>>, retry: RetryPolicy) -> Self {
        Self { providers, retry }
    }

    /// Provisioner with the direct url and indirect id strategies.
    pub fn from_config(config: &DownloadConfig) -> Result<Self, ProvisionError> {
        let options = DownloadOptions::from(config);
        let providers: Vec<Box<dyn SourceProvider>> = vec![
            Box::new(DirectUrlSourceProvider::new(&options)?),
            Box::new(IndirectIdSourceProvider::new(&options)?),
        ];
        let retry = RetryPolicy {
            retries: config.retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        };
        Ok(Self::new(providers, retry))
    }

    /// Provisions every spec independently; one failure never stops the rest.
    pub fn ensure(&self, specs: &[ArtifactSpec]) -> ProvisionResult {
        let outcomes = specs.iter().map(|spec| self.ensure_one(spec)).collect();
        let result = ProvisionResult::from_outcomes(outcomes);

        if result.all_succeeded {
            info!("All {} artifacts are available", result.outcomes.len());
        } else {
            error!(
                "{} of {} artifacts could not be provisioned",
                result.failures().count(),
                result.outcomes.len()
            );
        }
        result
    }

    fn ensure_one(&self, spec: &ArtifactSpec) -> DownloadOutcome {
        if let Some(size) = DirUtils::regular_file_size(&spec.local_path)
            && size > 0
        {
            debug!("{} already present at {:?} ({} bytes)", spec.name, spec.local_path, size);
            return Self::outcome(spec, OutcomeStatus::Success, size, None);
        }

        if let Err(err) = spec.validate() {
            error!("Cannot provision {}: {}", spec.name, err);
            return Self::outcome(spec, OutcomeStatus::Failed(err), 0, None);
        }

        let mut last_err = None;
        for source in &spec.sources {
            info!("Fetching {} from {}", spec.name, source);
            match self.fetch_from(source, &spec.local_path) {
                Ok(bytes) => {
                    info!("✅ {} written to {:?} ({} bytes)", spec.name, spec.local_path, bytes);
                    return Self::outcome(spec, OutcomeStatus::Success, bytes, Some(source.clone()));
                }
                Err(err) => {
                    warn!("❌ {} from {} failed: {}", spec.name, source, err);
                    last_err = Some(err);
                }
            }
        }

        let err = last_err.unwrap_or_else(|| {
            ProvisionError::Configuration(format!("no source attempted for '{}'", spec.name))
        });
        Self::outcome(spec, OutcomeStatus::Failed(err), 0, None)
    }

    /// One source, with retries and the post-download verification gate.
    fn fetch_from(&self, source: &SourceDescriptor, dest: &Path) -> Result<u64, ProvisionError> {
        source.validate()?;
        let provider = self
            .providers
            .iter()
            .find(|provider| provider.supports(source))
            .ok_or_else(|| {
                ProvisionError::Configuration(format!("no provider registered for {source}"))
            })?;

        let mut attempt = 0;
        let stats = loop {
            match provider.fetch(source, dest) {
                Ok(stats) => break stats,
                Err(err) if err.is_retryable() && attempt < self.retry.retries => {
                    let delay = self.retry.delay(attempt);
                    attempt += 1;
                    warn!(
                        "{} attempt {} failed ({}), retrying in {:?}",
                        provider.name(),
                        attempt,
                        err,
                        delay
                    );
                    thread::sleep(delay);
                }
                Err(err) => return Err(err),
            }
        };

        debug!(
            "{} wrote {} bytes in {} chunks",
            provider.name(),
            stats.bytes_written,
            stats.chunks
        );
        Self::verify(dest, stats)
    }

    fn verify(dest: &Path, stats: StreamStats) -> Result<u64, ProvisionError> {
        match DirUtils::regular_file_size(dest) {
            Some(size) if size > 0 && stats.bytes_written > 0 => Ok(stats.bytes_written),
            Some(_) => {
                if let Err(err) = fs::remove_file(dest) {
                    warn!("Could not remove empty artifact {:?}: {}", dest, err);
                }
                Err(ProvisionError::Verification(format!(
                    "{dest:?} is empty after download"
                )))
            }
            None => Err(ProvisionError::Verification(format!(
                "{dest:?} does not exist after download"
            ))),
        }
    }

    fn outcome(
        spec: &ArtifactSpec,
        status: OutcomeStatus,
        bytes_written: u64,
        source: Option<SourceDescriptor>,
    ) -> DownloadOutcome {
        DownloadOutcome {
            artifact: spec.clone(),
            status,
            bytes_written,
            source,
        }
    }
}
