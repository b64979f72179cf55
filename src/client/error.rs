use std::io;
use thiserror::Error;

use crate::error;

pub type FtpResult<T> = Result<T, Error>;

/// Enum for client errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A connect argument is missing or empty
    #[error("Missing {0}?")]
    InvalidParameter(&'static str),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// A credential field is missing or empty
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    /// Filesystem operation attempted before a successful login
    #[error("Session is not authenticated")]
    NotAuthenticated,
    #[error("Session is not connected")]
    NotConnected,
    #[error("Session is already authenticated")]
    AlreadyAuthenticated,
    /// The session was closed, open a new one
    #[error("Session is closed")]
    Closed,
    #[error("\"{0}\" is not a directory")]
    NotADirectory(String),
    #[error("Unable to list \"{path}\": {reason}")]
    ListingFailed { path: String, reason: String },
    #[error("Unable to create \"{path}\": {reason}")]
    CreateFailed { path: String, reason: String },
    #[error("Unable to delete \"{path}\": {reason}")]
    DeleteFailed { path: String, reason: String },
    /// The working directory could not be queried or restored
    #[error("Unable to resolve the current directory: {0}")]
    CursorUnavailable(String),
    #[error("Unable to put the file \"{path}\": {reason}")]
    TransferFailed { path: String, reason: String },
    /// Local filesystem failure while reading upload sources
    #[error("Local \"{path}\": {reason}")]
    Local { path: String, reason: String },
    /// A single primitive failed
    #[error("{0}")]
    Command(#[from] error::Error),
}

impl Error {
    pub(crate) fn listing(path: &str, err: &error::Error) -> Self {
        Self::ListingFailed {
            path: path.to_owned(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn create(path: &str, err: &error::Error) -> Self {
        Self::CreateFailed {
            path: path.to_owned(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn delete(path: &str, err: &error::Error) -> Self {
        Self::DeleteFailed {
            path: path.to_owned(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn transfer(path: &str, err: &error::Error) -> Self {
        Self::TransferFailed {
            path: path.to_owned(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn local<P: AsRef<std::path::Path>>(path: P, err: &io::Error) -> Self {
        Self::Local {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        }
    }
}
