use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

use super::error::{Error, FtpResult};

const DEFAULT_PORT: u16 = 21;
const DEFAULT_TIMEOUT_SECS: u64 = 90;

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_secure() -> bool {
    true
}

/// Where and how to open the control connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectOptions {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Connect timeout in seconds, enforced by the connection.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Use TLS on the control connection.
    #[serde(default = "default_secure")]
    pub secure: bool,
}

impl ConnectOptions {
    pub fn new<H: Into<String>>(host: H) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            secure: true,
        }
    }

    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub const fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    #[must_use]
    pub const fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub(crate) fn validate(&self) -> FtpResult<()> {
        if self.host.trim().is_empty() {
            return Err(Error::InvalidParameter("host"));
        }
        if self.port == 0 {
            return Err(Error::InvalidParameter("port"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::InvalidParameter("timeout"));
        }
        Ok(())
    }
}

/// Login pair. The secret never appears in `Debug` output and is left out
/// when serializing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    #[serde(skip_serializing)]
    pub secret: String,
}

impl Credentials {
    pub fn new<U: Into<String>, S: Into<String>>(username: U, secret: S) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    pub(crate) fn validate(&self) -> FtpResult<()> {
        if self.username.is_empty() {
            return Err(Error::MissingCredential("username"));
        }
        if self.secret.is_empty() {
            return Err(Error::MissingCredential("secret"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .finish()
    }
}
