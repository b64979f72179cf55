use super::ListOrder;
use crate::{
    client::{error::FtpResult, Connection, SessionInner},
    listing::{Entry, EntryKinds},
};

impl<C: Connection> SessionInner<C> {
    pub(crate) async fn is_directory(&mut self, path: &str) -> FtpResult<bool> {
        self.can_enter(path).await
    }

    pub(crate) async fn is_empty(&mut self, path: &str) -> FtpResult<bool> {
        Ok(self.count(path, None, false).await? == 0)
    }

    /// Without a filter the name listing is enough, otherwise the detailed
    /// listing provides the types.
    pub(crate) async fn count(
        &mut self,
        path: &str,
        kinds: Option<EntryKinds>,
        recursive: bool,
    ) -> FtpResult<usize> {
        match kinds {
            None => Ok(self
                .list(path, recursive, ListOrder::Ascending)
                .await?
                .len()),
            Some(kinds) => Ok(self
                .scan(path, recursive)
                .await?
                .iter()
                .filter(|entry| kinds.matches(entry.kind))
                .count()),
        }
    }

    /// Unreadable sizes count as zero.
    pub(crate) async fn size(&mut self, path: &str, recursive: bool) -> FtpResult<u64> {
        Ok(self
            .scan(path, recursive)
            .await?
            .iter()
            .map(Entry::reported_size)
            .sum())
    }
}
