use thiserror::Error;

/// Why provisioning a single artifact failed.
///
/// These never abort a provisioning run; they are recorded on the artifact's
/// outcome and the caller decides what to do with them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("network error: {url} returned status {status}")]
    Network { url: String, status: u16 },

    #[error("download error: {0}")]
    Download(String),

    #[error("verification error: {0}")]
    Verification(String),
}

impl ProvisionError {
    /// Transport failures and server-side statuses may go away on their own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { status, .. } => *status >= 500 || *status == 429,
            Self::Download(_) => true,
            Self::Configuration(_) | Self::Verification(_) => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "ConfigurationError",
            Self::Network { .. } => "NetworkError",
            Self::Download(_) => "DownloadError",
            Self::Verification(_) => "VerificationError",
        }
    }
}

impl From<std::io::Error> for ProvisionError {
    fn from(err: std::io::Error) -> Self {
        Self::Download(err.to_string())
    }
}

impl From<reqwest::Error> for ProvisionError {
    fn from(err: reqwest::Error) -> Self {
        match (err.status(), err.url()) {
            (Some(status), Some(url)) => Self::Network {
                url: url.to_string(),
                status: status.as_u16(),
            },
            _ => Self::Download(err.to_string()),
        }
    }
}
