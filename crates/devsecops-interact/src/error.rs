//! Interaction layer errors

use std::path::PathBuf;

/// Failures of external I/O.
///
/// These never cross into the models: callers log them and fall back.
#[derive(thiserror::Error, Debug)]
pub enum InteractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    #[error("Unknown checklist item: {0}")]
    UnknownItem(String),

    #[error("Invalid artifact name: {}", .0.display())]
    InvalidArtifactName(PathBuf),
}

pub type InteractResult<T> = Result<T, InteractError>;
