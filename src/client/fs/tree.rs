use super::ListOrder;
use crate::{
    client::{
        error::{Error, FtpResult},
        Connection, SessionInner,
    },
    utils::BoxFuture,
};

impl<C: Connection> SessionInner<C> {
    pub(crate) async fn make_directory(&mut self, path: &str, recursive: bool) -> FtpResult<()> {
        if !recursive {
            return self
                .conn
                .create_directory(path)
                .await
                .map_err(|err| Error::create(path, &err));
        }

        let saved = self.save_cursor().await?;
        let result = self.make_segments(path).await;
        self.restore_cursor(saved, result).await
    }

    /// Walks `path` one segment at a time, creating what cannot be entered.
    async fn make_segments(&mut self, path: &str) -> FtpResult<()> {
        if path.starts_with('/') {
            self.conn
                .change_directory("/")
                .await
                .map_err(|err| Error::create(path, &err))?;
        }

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if self.conn.change_directory(segment).await.is_ok() {
                continue;
            }

            trace!("creating segment {segment} of {path}");
            self.conn
                .create_directory(segment)
                .await
                .map_err(|err| Error::create(path, &err))?;
            self.conn
                .change_directory(segment)
                .await
                .map_err(|err| Error::create(path, &err))?;
        }
        Ok(())
    }

    pub(crate) fn remove_directory<'a>(
        &'a mut self,
        path: &'a str,
        recursive: bool,
    ) -> BoxFuture<'a, FtpResult<()>> {
        Box::pin(async move {
            if recursive {
                // deepest names first
                for child in self.list(path, false, ListOrder::Descending).await? {
                    if !self.remove(&child, true).await {
                        debug!("unable to remove {child}");
                    }
                }
            }

            self.conn
                .delete_directory(path)
                .await
                .map_err(|err| Error::delete(path, &err))
        })
    }

    /// Tries a file first, then a directory. Never fails, the outcome is
    /// only logged.
    pub(crate) async fn remove(&mut self, path: &str, recursive: bool) -> bool {
        let file_err = match self.conn.delete_file(path).await {
            Ok(()) => return true,
            Err(err) => err,
        };

        match self.is_directory(path).await {
            Ok(true) => match self.remove_directory(path, recursive).await {
                Ok(()) => true,
                Err(err) => {
                    debug!("{err}");
                    false
                }
            },
            Ok(false) => {
                debug!("unable to delete {path}: {file_err}");
                false
            }
            Err(err) => {
                debug!("unable to inspect {path}: {err}");
                false
            }
        }
    }

    pub(crate) async fn clean(&mut self, path: &str) -> FtpResult<bool> {
        for child in self.list(path, false, ListOrder::Ascending).await? {
            if !self.remove(&child, true).await {
                warn!("unable to remove {child} while cleaning {path}");
            }
        }
        self.is_empty(path).await
    }
}
