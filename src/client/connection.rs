use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;

use super::options::ConnectOptions;
use crate::error::Error;

/// Representation type used for stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    Ascii,
    #[default]
    Binary,
}

/// Control connection to an FTP server. This is `async_trait`
///
/// Implementors own the transport: socket, optional TLS, the wire encoding
/// of commands and data-channel negotiation, plus any timeout or retry
/// policy. Every method is one command/response exchange; [`FtpSession`]
/// never issues two at once.
///
/// [`FtpSession`]: super::FtpSession
#[async_trait]
pub trait Connection: Send {
    /// Opens the control connection, using TLS when `options.secure` is set.
    async fn connect(&mut self, options: &ConnectOptions) -> Result<(), Error>;

    async fn authenticate(&mut self, username: &str, secret: &str) -> Result<(), Error>;

    /// Releases the transport.
    async fn close(&mut self) -> Result<(), Error>;

    async fn change_directory(&mut self, path: &str) -> Result<(), Error>;

    /// Called on `up`. Defaults to changing into `..`.
    async fn change_to_parent(&mut self) -> Result<(), Error> {
        self.change_directory("..").await
    }

    async fn current_directory(&mut self) -> Result<String, Error>;

    async fn delete_file(&mut self, path: &str) -> Result<(), Error>;

    async fn create_directory(&mut self, path: &str) -> Result<(), Error>;

    async fn delete_directory(&mut self, path: &str) -> Result<(), Error>;

    async fn rename(&mut self, from: &str, to: &str) -> Result<(), Error>;

    /// Names of the objects in `path` (`NLST`).
    async fn list_names(&mut self, path: &str) -> Result<Vec<String>, Error>;

    /// Raw lines of the detailed listing of `path` (`LIST`).
    async fn list_detailed(&mut self, path: &str) -> Result<Vec<String>, Error>;

    /// Stores everything readable from `source` at `remote_path`.
    async fn upload(
        &mut self,
        remote_path: &str,
        source: &mut (dyn AsyncRead + Unpin + Send),
        mode: TransferMode,
    ) -> Result<(), Error>;

    /// Unix timestamp of the last modification, `-1` when unknown.
    async fn last_modified(&mut self, path: &str) -> Result<i64, Error>;

    /// Lines of the server's `HELP` reply.
    async fn help(&mut self) -> Result<Vec<String>, Error> {
        Err(Error::Unsupported("HELP".to_owned()))
    }
}
