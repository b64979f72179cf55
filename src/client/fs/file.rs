use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::{io::Cursor, path::Path};
use tokio::io::AsyncRead;

use super::LocalFs;
use crate::{
    client::{
        error::{Error, FtpResult},
        Connection, SessionInner, TransferMode,
    },
    utils,
};

impl<C: Connection> SessionInner<C> {
    pub(crate) async fn put(
        &mut self,
        remote_path: &str,
        source: &mut (dyn AsyncRead + Unpin + Send),
        mode: TransferMode,
    ) -> FtpResult<()> {
        trace!("storing {remote_path} ({mode:?})");
        self.conn
            .upload(remote_path, source, mode)
            .await
            .map_err(|err| Error::transfer(remote_path, &err))
    }

    pub(crate) async fn upload_from<L: LocalFs + ?Sized>(
        &mut self,
        local: &L,
        local_path: &Path,
        remote_path: &str,
        mode: TransferMode,
    ) -> FtpResult<()> {
        let mut source = local
            .open(local_path)
            .await
            .map_err(|err| Error::local(local_path, &err))?;
        self.put(remote_path, &mut *source, mode).await
    }

    pub(crate) async fn put_from_bytes(&mut self, remote_path: &str, content: Bytes) -> FtpResult<()> {
        let mut source = Cursor::new(content);
        self.put(remote_path, &mut source, TransferMode::Binary)
            .await
    }

    /// Stores `local_path` under its file name in the working directory.
    pub(crate) async fn put_from_path<L: LocalFs + ?Sized>(
        &mut self,
        local: &L,
        local_path: &Path,
    ) -> FtpResult<()> {
        let name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Local {
                path: local_path.display().to_string(),
                reason: "no file name".to_owned(),
            })?;
        self.upload_from(local, local_path, &name, TransferMode::Binary)
            .await
    }

    pub(crate) async fn modified_time(&mut self, path: &str) -> FtpResult<Option<DateTime<Utc>>> {
        let secs = self.conn.last_modified(path).await?;
        Ok(utils::unix(secs))
    }
}
