//! The server-side working directory.
//!
//! Anything that changes directory saves the cursor first and restores it
//! before returning, on success and on error alike:
//!
//! ```ignore
//! let saved = self.save_cursor().await?;
//! let result = async { /* may change directory, may fail */ }.await;
//! self.restore_cursor(saved, result).await
//! ```

use super::{
    error::{Error, FtpResult},
    Connection, SessionInner,
};

/// Working directory captured by [`SessionInner::save_cursor`].
#[must_use = "a saved cursor has to be restored"]
#[derive(Debug)]
pub(crate) struct SavedCursor(String);

impl<C: Connection> SessionInner<C> {
    pub(crate) async fn save_cursor(&mut self) -> FtpResult<SavedCursor> {
        self.conn
            .current_directory()
            .await
            .map(SavedCursor)
            .map_err(|err| Error::CursorUnavailable(err.to_string()))
    }

    /// Changes back to `saved` and hands `result` through.
    ///
    /// A failed restore never hides the error of the operation itself.
    /// When the operation succeeded it is reported as `CursorUnavailable`.
    pub(crate) async fn restore_cursor<T>(
        &mut self,
        saved: SavedCursor,
        result: FtpResult<T>,
    ) -> FtpResult<T> {
        let SavedCursor(dir) = saved;
        match self.conn.change_directory(&dir).await {
            Ok(()) => result,
            Err(err) => {
                error!("unable to restore working directory \"{dir}\": {err}");
                result.and(Err(Error::CursorUnavailable(format!(
                    "unable to return to \"{dir}\": {err}"
                ))))
            }
        }
    }

    /// Changes into `path` and back, reporting whether that worked.
    pub(crate) async fn can_enter(&mut self, path: &str) -> FtpResult<bool> {
        let saved = self.save_cursor().await?;
        let entered = match self.conn.change_directory(path).await {
            Ok(()) => true,
            Err(err) => {
                trace!("\"{path}\" is not a directory: {err}");
                false
            }
        };
        self.restore_cursor(saved, Ok(entered)).await
    }

    /// Changes into `path` and back. Returns the directory the server
    /// reported while inside, or `None` if `path` could not be entered.
    pub(crate) async fn probe_directory(&mut self, path: &str) -> FtpResult<Option<String>> {
        let saved = self.save_cursor().await?;
        let result = async {
            match self.conn.change_directory(path).await {
                Ok(()) => self
                    .conn
                    .current_directory()
                    .await
                    .map(Some)
                    .map_err(|err| Error::CursorUnavailable(err.to_string())),
                Err(err) => {
                    trace!("\"{path}\" is not a directory: {err}");
                    Ok(None)
                }
            }
        }
        .await;
        self.restore_cursor(saved, result).await
    }
}
