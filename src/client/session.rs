use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::Path;
use tokio::{
    io::AsyncRead,
    sync::{Mutex, MutexGuard},
};

use super::{
    error::{Error, FtpResult},
    fs::{ListOrder, LocalFs, TokioFs},
    options::{ConnectOptions, Credentials},
    Connection, TransferMode,
};
use crate::{
    listing::{Entry, EntryKinds},
    utils::BoxFuture,
};

/// Lifecycle of a session. Only `Authenticated` allows filesystem
/// operations and `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    Authenticated,
    Closed,
}

pub(crate) struct SessionInner<C> {
    pub(crate) conn: C,
    pub(crate) state: SessionState,
}

/// High-level FTP session for filesystem-like interaction with a server.
///
/// The connection sits behind a lock that every operation holds from its
/// first command to its last, so operations on one session never
/// interleave and always find the working directory where the previous
/// one left it. Independent sessions share nothing.
pub struct FtpSession<C> {
    inner: Mutex<SessionInner<C>>,
}

impl<C: Connection> FtpSession<C> {
    /// Wraps a connection that has not been opened yet.
    pub fn new(conn: C) -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                conn,
                state: SessionState::Disconnected,
            }),
        }
    }

    /// Connects and logs in. The connection is closed again if the login
    /// is rejected.
    pub async fn open(
        conn: C,
        options: &ConnectOptions,
        credentials: &Credentials,
    ) -> FtpResult<Self> {
        let session = Self::new(conn);
        session.connect(options).await?;

        if let Err(err) = session.authenticate(credentials).await {
            if let Err(close) = session.close().await {
                warn!("closing after failed login: {close}");
            }
            return Err(err);
        }

        Ok(session)
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    pub async fn connect(&self, options: &ConnectOptions) -> FtpResult<()> {
        options.validate()?;

        let mut inner = self.inner.lock().await;
        match inner.state {
            SessionState::Disconnected => {}
            SessionState::Closed => return Err(Error::Closed),
            SessionState::Connected | SessionState::Authenticated => {
                warn!("connection already open");
                return Ok(());
            }
        }

        debug!(
            "connecting to {}:{} (secure: {}, timeout: {}s)",
            options.host, options.port, options.secure, options.timeout_secs
        );
        inner
            .conn
            .connect(options)
            .await
            .map_err(|err| Error::ConnectionFailed(format!("{}: {err}", options.host)))?;

        inner.state = SessionState::Connected;
        info!("connected to {}:{}", options.host, options.port);
        Ok(())
    }

    /// Logs in. A rejected login leaves the session connected, so another
    /// attempt can be made on the same connection.
    pub async fn authenticate(&self, credentials: &Credentials) -> FtpResult<()> {
        let mut inner = self.inner.lock().await;
        match inner.state {
            SessionState::Connected => {}
            SessionState::Disconnected => return Err(Error::NotConnected),
            SessionState::Authenticated => return Err(Error::AlreadyAuthenticated),
            SessionState::Closed => return Err(Error::Closed),
        }
        credentials.validate()?;

        inner
            .conn
            .authenticate(&credentials.username, &credentials.secret)
            .await
            .map_err(|err| {
                warn!("login rejected for {}", credentials.username);
                Error::AuthenticationFailed(err.to_string())
            })?;

        inner.state = SessionState::Authenticated;
        info!("logged in as {}", credentials.username);
        Ok(())
    }

    /// Closes the connection. Closing a session that is already closed or
    /// was never connected does nothing.
    ///
    /// The session is `Closed` afterwards even if the transport reported
    /// an error while shutting down; that error is returned.
    pub async fn close(&self) -> FtpResult<()> {
        let mut inner = self.inner.lock().await;
        match inner.state {
            SessionState::Connected | SessionState::Authenticated => {
                let result = inner.conn.close().await;
                inner.state = SessionState::Closed;
                debug!("session closed");
                result.map_err(Error::from)
            }
            SessionState::Disconnected | SessionState::Closed => Ok(()),
        }
    }

    /// Runs `f` and closes the session afterwards, whatever `f` returned.
    pub async fn close_after<T, F>(&self, f: F) -> FtpResult<T>
    where
        F: for<'s> FnOnce(&'s Self) -> BoxFuture<'s, FtpResult<T>>,
    {
        let result = f(self).await;
        if let Err(err) = self.close().await {
            warn!("error while closing session: {err}");
        }
        result
    }

    /// Takes the connection back, whatever state it is in.
    pub fn into_connection(self) -> C {
        self.inner.into_inner().conn
    }

    async fn ready(&self) -> FtpResult<MutexGuard<'_, SessionInner<C>>> {
        let inner = self.inner.lock().await;
        if inner.state == SessionState::Authenticated {
            Ok(inner)
        } else {
            Err(Error::NotAuthenticated)
        }
    }

    /// Paths of the objects in `path`, from the name-only listing.
    ///
    /// Recursive listings descend into every child that can be entered,
    /// symlinked directories included. A directory reached a second time
    /// through another link is listed but not descended into again.
    pub async fn list(
        &self,
        path: &str,
        recursive: bool,
        order: ListOrder,
    ) -> FtpResult<Vec<String>> {
        self.ready().await?.list(path, recursive, order).await
    }

    /// Parsed entries of the detailed listing of `path`.
    pub async fn scan(&self, path: &str, recursive: bool) -> FtpResult<Vec<Entry>> {
        self.ready().await?.scan(path, recursive).await
    }

    /// Checks that `path` can be entered. The working directory is the
    /// same afterwards.
    pub async fn is_directory(&self, path: &str) -> FtpResult<bool> {
        self.ready().await?.is_directory(path).await
    }

    pub async fn is_empty(&self, path: &str) -> FtpResult<bool> {
        self.ready().await?.is_empty(path).await
    }

    /// Counts the objects in `path`, only those of `kinds` when given.
    pub async fn count(
        &self,
        path: &str,
        kinds: Option<EntryKinds>,
        recursive: bool,
    ) -> FtpResult<usize> {
        self.ready().await?.count(path, kinds, recursive).await
    }

    /// Sum of the reported sizes in `path`, in bytes.
    pub async fn size(&self, path: &str, recursive: bool) -> FtpResult<u64> {
        self.ready().await?.size(path, recursive).await
    }

    /// Creates a directory, with all missing parents when `recursive`.
    pub async fn make_directory(&self, path: &str, recursive: bool) -> FtpResult<()> {
        self.ready().await?.make_directory(path, recursive).await
    }

    /// Removes a directory, after removing everything inside it when
    /// `recursive`.
    pub async fn remove_directory(&self, path: &str, recursive: bool) -> FtpResult<()> {
        self.ready().await?.remove_directory(path, recursive).await
    }

    /// Removes everything inside `path`. Returns whether it is empty now.
    pub async fn clean(&self, path: &str) -> FtpResult<bool> {
        self.ready().await?.clean(path).await
    }

    /// Best-effort removal of a file or directory.
    ///
    /// Failures are reported as `Ok(false)`; the only error is calling this
    /// on a session that is not authenticated. Use [`Self::delete_file`]
    /// or [`Self::remove_directory`] to get the failure itself.
    pub async fn remove(&self, path: &str, recursive: bool) -> FtpResult<bool> {
        Ok(self.ready().await?.remove(path, recursive).await)
    }

    /// Uploads the local tree under `local_root` into `remote_root`.
    pub async fn mirror_upload<P: AsRef<Path>>(
        &self,
        local_root: P,
        remote_root: &str,
        mode: TransferMode,
    ) -> FtpResult<()> {
        self.mirror_upload_from(&TokioFs, local_root, remote_root, mode)
            .await
    }

    /// Same as [`Self::mirror_upload`] reading from `local`.
    pub async fn mirror_upload_from<L, P>(
        &self,
        local: &L,
        local_root: P,
        remote_root: &str,
        mode: TransferMode,
    ) -> FtpResult<()>
    where
        L: LocalFs,
        P: AsRef<Path>,
    {
        let local_root = local_root.as_ref();
        info!("mirroring {} to {remote_root}", local_root.display());
        self.ready()
            .await?
            .mirror_upload(local, local_root, remote_root, mode)
            .await
    }

    /// Stores everything readable from `source` at `remote_path`.
    pub async fn put(
        &self,
        remote_path: &str,
        source: &mut (dyn AsyncRead + Unpin + Send),
        mode: TransferMode,
    ) -> FtpResult<()> {
        self.ready().await?.put(remote_path, source, mode).await
    }

    pub async fn put_from_bytes<B: Into<Bytes>>(
        &self,
        remote_path: &str,
        content: B,
    ) -> FtpResult<()> {
        self.ready()
            .await?
            .put_from_bytes(remote_path, content.into())
            .await
    }

    /// Uploads a local file under its own name into the working directory.
    pub async fn put_from_path<P: AsRef<Path>>(&self, local_path: P) -> FtpResult<()> {
        self.put_from_path_with(&TokioFs, local_path).await
    }

    pub async fn put_from_path_with<L, P>(&self, local: &L, local_path: P) -> FtpResult<()>
    where
        L: LocalFs,
        P: AsRef<Path>,
    {
        self.ready()
            .await?
            .put_from_path(local, local_path.as_ref())
            .await
    }

    /// Last modification time, `None` when the server does not know it.
    pub async fn modified_time(&self, path: &str) -> FtpResult<Option<DateTime<Utc>>> {
        self.ready().await?.modified_time(path).await
    }

    pub async fn current_directory(&self) -> FtpResult<String> {
        Ok(self.ready().await?.conn.current_directory().await?)
    }

    pub async fn change_directory(&self, path: &str) -> FtpResult<()> {
        Ok(self.ready().await?.conn.change_directory(path).await?)
    }

    /// Changes to the parent directory.
    pub async fn up(&self) -> FtpResult<()> {
        Ok(self.ready().await?.conn.change_to_parent().await?)
    }

    pub async fn rename(&self, from: &str, to: &str) -> FtpResult<()> {
        Ok(self.ready().await?.conn.rename(from, to).await?)
    }

    pub async fn delete_file(&self, path: &str) -> FtpResult<()> {
        let mut inner = self.ready().await?;
        inner
            .conn
            .delete_file(path)
            .await
            .map_err(|err| Error::delete(path, &err))
    }

    /// Help text of the remote server.
    pub async fn help(&self) -> FtpResult<Vec<String>> {
        Ok(self.ready().await?.conn.help().await?)
    }
}
