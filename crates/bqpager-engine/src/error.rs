use std::fmt;

use crate::source::SourceError;

/// Result type for bqpager-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the engine
#[derive(Debug)]
pub enum Error {
    /// The row source failed for a reason other than exhaustion
    Source(SourceError),

    /// The background fetch thread could not be started
    Spawn(std::io::Error),

    /// An operation was attempted in a state that does not allow it
    InvalidState(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Source(err) => write!(f, "Row source error: {}", err),
            Error::Spawn(err) => write!(f, "Failed to start fetch thread: {}", err),
            Error::InvalidState(msg) => write!(f, "Invalid pager state: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Source(err) => Some(err.as_ref()),
            Error::Spawn(err) => Some(err),
            Error::InvalidState(_) => None,
        }
    }
}

impl From<SourceError> for Error {
    fn from(err: SourceError) -> Self {
        Error::Source(err)
    }
}
