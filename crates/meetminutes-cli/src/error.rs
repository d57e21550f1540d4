//! CLI error types.

use std::fmt;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Configuration error.
    Config(String),
    /// Error from one of the Google service clients.
    Google(meetminutes_google::GoogleError),
    /// IO error.
    Io(std::io::Error),
    /// One or more meetings failed to archive.
    Archive(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Google(err) => write!(f, "service error: {}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Archive(msg) => write!(f, "archive failed: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Google(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<meetminutes_google::GoogleError> for CliError {
    fn from(err: meetminutes_google::GoogleError) -> Self {
        Self::Google(err)
    }
}
