use thiserror::Error;

use crate::task::{TaskId, ValidationError};

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Board request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Board API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error(
        "No board available.\n\
         Set board.default_board_id or FOCALBOARD_DEFAULT_BOARD_ID, or call initialize() first"
    )]
    NoBoard,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unexpected board response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, BoardError>;
