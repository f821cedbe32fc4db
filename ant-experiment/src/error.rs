use ant_core::ConfigurationError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by the display, input or storage collaborators.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("display error: {0}")]
    Display(String),

    #[error("input error: {0}")]
    Input(String),

    #[error("session aborted by the participant")]
    Aborted,

    #[error("failed to write trial record")]
    Io(#[from] std::io::Error),

    #[error("failed to encode trial record")]
    Encode(#[from] serde_json::Error),
}

/// Anything that stops a trial or a session.
#[derive(Debug, Error)]
pub enum TrialError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Host(#[from] HostError),
}

impl TrialError {
    pub fn is_abort(&self) -> bool {
        matches!(self, TrialError::Host(HostError::Aborted))
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("cannot read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigurationError),
}
