use thiserror::Error;

/// Errors surfaced by the console.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] dynarepo_core::Error),
}

impl From<dynarepo_core::PlanError> for ConsoleError {
    fn from(err: dynarepo_core::PlanError) -> Self {
        ConsoleError::Core(err.into())
    }
}
