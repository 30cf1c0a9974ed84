use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("LINE request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LINE API returned HTTP {status}: {body}")]
    LineApi { status: u16, body: String },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
