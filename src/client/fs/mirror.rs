use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use super::LocalFs;
use crate::{
    client::{
        error::{Error, FtpResult},
        Connection, SessionInner, TransferMode,
    },
    utils::{self, BoxFuture},
};

impl<C: Connection> SessionInner<C> {
    /// Recreates the tree under `local_root` inside `remote_root`, children
    /// in name order. Stops at the first failure.
    ///
    /// A local directory reached a second time through a link is skipped.
    pub(crate) async fn mirror_upload<L: LocalFs + ?Sized>(
        &mut self,
        local: &L,
        local_root: &Path,
        remote_root: &str,
        mode: TransferMode,
    ) -> FtpResult<()> {
        let root = local
            .canonicalize(local_root)
            .await
            .map_err(|err| Error::local(local_root, &err))?;
        let mut visited = HashSet::from([root]);
        self.mirror_tree(local, local_root, remote_root, mode, &mut visited)
            .await
    }

    fn mirror_tree<'a, L: LocalFs + ?Sized>(
        &'a mut self,
        local: &'a L,
        local_dir: &'a Path,
        remote_dir: &'a str,
        mode: TransferMode,
        visited: &'a mut HashSet<PathBuf>,
    ) -> BoxFuture<'a, FtpResult<()>> {
        Box::pin(async move {
            let mut children = local
                .read_dir(local_dir)
                .await
                .map_err(|err| Error::local(local_dir, &err))?;
            children.retain(|child| child.name != "." && child.name != "..");
            children.sort_by(|a, b| a.name.cmp(&b.name));

            for child in children {
                let local_path = local_dir.join(&child.name);
                let remote_path = utils::join(remote_dir, &child.name);

                if !child.is_dir {
                    self.upload_from(local, &local_path, &remote_path, mode)
                        .await?;
                    continue;
                }

                let canonical = local
                    .canonicalize(&local_path)
                    .await
                    .map_err(|err| Error::local(&local_path, &err))?;
                if !visited.insert(canonical) {
                    warn!(
                        "\"{}\" leads to a directory already mirrored, skipping",
                        local_path.display()
                    );
                    continue;
                }

                if !self.is_directory(&remote_path).await? {
                    debug!("creating {remote_path}");
                    self.conn
                        .create_directory(&remote_path)
                        .await
                        .map_err(|err| Error::create(&remote_path, &err))?;
                }
                self.mirror_tree(local, &local_path, &remote_path, mode, visited)
                    .await?;
            }
            Ok(())
        })
    }
}
