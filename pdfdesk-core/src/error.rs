use thiserror::Error;

use crate::document::FileConstraintError;
use crate::workflow::TransitionError;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File rejected: {0}")]
    FileConstraint(#[from] FileConstraintError),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Workflow error: {0}")]
    Transition(#[from] TransitionError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeskError>;
