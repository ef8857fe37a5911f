use thiserror::Error;

/// Error kinds surfaced by the cleaning pipeline and its collaborators.
#[derive(Error, Debug)]
pub enum CleanError {
    #[error("failed to load recording: {0}")]
    Load(String),

    #[error("channel canonicalization failed: {0}")]
    Rename(String),

    #[error("malformed recording: {0}")]
    ShapeMismatch(String),

    #[error("source separation failed: {0}")]
    Decomposition(String),

    #[error("artifact scoring failed: {0}")]
    ArtifactDetection(String),

    #[error("failed to persist output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CleanError>;
