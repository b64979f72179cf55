use std::io;
use thiserror::Error;

/// Failure reported by a [`Connection`](crate::client::Connection) primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("I/O: {0}")]
    IO(String),
    /// The server answered with a transient or permanent negative reply.
    #[error("{code} {message}")]
    Reply { code: u16, message: String },
    #[error("Timeout")]
    Timeout,
    #[error("Unexpected EOF on stream")]
    UnexpectedEof,
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    pub fn reply<M: Into<String>>(code: u16, message: M) -> Self {
        Self::Reply {
            code,
            message: message.into(),
        }
    }

    /// Reply code of a negative server reply, if this is one.
    #[must_use]
    pub const fn code(&self) -> Option<u16> {
        match self {
            Self::Reply { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut => Self::Timeout,
            io::ErrorKind::UnexpectedEof => Self::UnexpectedEof,
            _ => Self::IO(err.to_string()),
        }
    }
}
