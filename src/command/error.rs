use thiserror::Error;

use crate::task::ValidationError;

/// Text that could not be turned into a usable command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Message is empty")]
    Empty,

    #[error("Message is not a recognized command")]
    Unrecognized,

    #[error("Unsupported command: {0}")]
    UnsupportedCommand(String),

    #[error("Please provide a task title")]
    MissingTitle,

    #[error("Please provide a search keyword")]
    MissingQuery,

    #[error("Please provide a task ID")]
    MissingTaskId,

    #[error("Nothing to update; give at least one field")]
    EmptyPatch,

    #[error("Unknown {key} filter: {value}")]
    InvalidFilter { key: String, value: String },
}

/// Why a command is invalid. Stored on the command, never raised.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
