use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{
    client::{
        error::{Error, FtpResult},
        Connection, SessionInner,
    },
    listing::{Entry, EntryMap, RawListParser},
    utils::{self, BoxFuture},
};

/// Ordering of name listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    #[default]
    Ascending,
    Descending,
}

impl ListOrder {
    fn sort(self, paths: &mut [String]) {
        match self {
            Self::Ascending => paths.sort_unstable(),
            Self::Descending => paths.sort_unstable_by(|a, b| b.cmp(a)),
        }
    }
}

#[derive(Default)]
struct NameWalk {
    /// Directories descended into, as the server resolved them.
    visited: HashSet<String>,
    seen: HashSet<String>,
    paths: Vec<String>,
}

impl NameWalk {
    fn push(&mut self, path: String) {
        if self.seen.insert(path.clone()) {
            self.paths.push(path);
        }
    }
}

impl<C: Connection> SessionInner<C> {
    pub(crate) async fn list(
        &mut self,
        path: &str,
        recursive: bool,
        order: ListOrder,
    ) -> FtpResult<Vec<String>> {
        let root = self
            .probe_directory(path)
            .await?
            .ok_or_else(|| Error::NotADirectory(path.to_owned()))?;

        let mut walk = NameWalk::default();
        let _ = walk.visited.insert(root);
        self.walk_names(&utils::normalize(path), recursive, &mut walk)
            .await?;

        let mut paths = walk.paths;
        order.sort(&mut paths);
        Ok(paths)
    }

    /// Names in `dir` without `.` and `..`.
    async fn names(&mut self, dir: &str) -> FtpResult<Vec<String>> {
        let names = self
            .conn
            .list_names(dir)
            .await
            .map_err(|err| Error::listing(dir, &err))?;

        Ok(names
            .iter()
            .map(|name| utils::basename(name))
            .filter(|name| !name.is_empty() && *name != "." && *name != "..")
            .map(str::to_owned)
            .collect())
    }

    fn walk_names<'a>(
        &'a mut self,
        dir: &'a str,
        recursive: bool,
        walk: &'a mut NameWalk,
    ) -> BoxFuture<'a, FtpResult<()>> {
        Box::pin(async move {
            for name in self.names(dir).await? {
                let child = utils::join(dir, &name);
                if !recursive {
                    walk.push(child);
                    continue;
                }

                match self.probe_directory(&child).await? {
                    Some(resolved) => {
                        walk.push(child.clone());
                        if walk.visited.insert(resolved) {
                            self.walk_names(&child, true, walk).await?;
                        } else {
                            warn!("\"{child}\" leads to a directory already listed, not descending");
                        }
                    }
                    None => walk.push(child),
                }
            }
            Ok(())
        })
    }

    /// Descends the same directories as a recursive [`Self::list`]:
    /// directories and links that can be entered, each resolved directory
    /// once. Children of a link are qualified with the link path.
    pub(crate) async fn scan(&mut self, path: &str, recursive: bool) -> FtpResult<Vec<Entry>> {
        let root = self
            .probe_directory(path)
            .await?
            .ok_or_else(|| Error::NotADirectory(path.to_owned()))?;

        let mut entries = EntryMap::new();
        let mut visited = HashSet::from([root]);
        self.walk_entries(&utils::normalize(path), recursive, &mut visited, &mut entries)
            .await?;

        Ok(entries.into_entries())
    }

    fn walk_entries<'a>(
        &'a mut self,
        dir: &'a str,
        recursive: bool,
        visited: &'a mut HashSet<String>,
        entries: &'a mut EntryMap,
    ) -> BoxFuture<'a, FtpResult<()>> {
        Box::pin(async move {
            let lines = self
                .conn
                .list_detailed(dir)
                .await
                .map_err(|err| Error::listing(dir, &err))?;

            for entry in RawListParser::new(dir).parse(lines) {
                let sub = (recursive && (entry.is_dir() || entry.is_symlink()))
                    .then(|| entry.path.clone());
                if let Some(old) = entries.insert(entry) {
                    debug!("\"{}\" reported twice", old.key());
                }

                let Some(sub) = sub else { continue };
                match self.probe_directory(&sub).await? {
                    Some(resolved) if visited.insert(resolved.clone()) => {
                        self.walk_entries(&sub, true, visited, entries).await?;
                    }
                    Some(_) => {
                        warn!("\"{sub}\" leads to a directory already listed, not descending");
                    }
                    None => {}
                }
            }
            Ok(())
        })
    }
}
