use std::fmt;

/// Result type for bqpager-providers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while talking to BigQuery
#[derive(Debug)]
pub enum Error {
    /// HTTP transport failed
    Http(reqwest::Error),

    /// Response body could not be decoded
    Json(serde_json::Error),

    /// IO operation failed (e.g. spawning gcloud)
    Io(std::io::Error),

    /// Credentials or project id could not be resolved
    Auth(String),

    /// BigQuery answered with an error status
    Api { status: u16, message: String },

    /// The query job itself failed
    Query(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(err) => write!(f, "HTTP error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Auth(msg) => write!(f, "Authentication error: {}", msg),
            Error::Api { status, message } => {
                write!(f, "BigQuery API error ({}): {}", status, message)
            }
            Error::Query(msg) => write!(f, "Query failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Auth(_) | Error::Api { .. } | Error::Query(_) => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message() {
        let err = Error::Api {
            status: 400,
            message: "Syntax error: Unexpected end of script".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "BigQuery API error (400): Syntax error: Unexpected end of script"
        );
    }
}
