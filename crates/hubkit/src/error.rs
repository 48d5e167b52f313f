//! Error types for hubkit.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server rejected the request with a 4xx status, or an operation
    /// that needs a token was invoked without one.
    #[error("authorization required")]
    AuthorizationRequired,

    #[error("HTTP error: status {0}")]
    HttpStatus(u16),

    /// The response could not be interpreted as an HTTP response at all.
    #[error("unexpected response")]
    UnexpectedError,

    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },

    /// A repository id or remote filename that does not map to a path
    /// inside the download base.
    #[error("invalid path '{0}'")]
    InvalidPath(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("transfer aborted: {0}")]
    TransferAborted(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
