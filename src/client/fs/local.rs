use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncRead};

/// Child of a local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Local side of uploads. This is `async_trait`
#[async_trait]
pub trait LocalFs: Send + Sync {
    /// Children of `path`, in no particular order. Symlinked directories
    /// are reported as directories.
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<LocalEntry>>;

    /// Opens `path` for reading.
    async fn open(&self, path: &Path) -> io::Result<Box<dyn AsyncRead + Unpin + Send>>;

    /// Path with every link resolved, used to enter each directory once.
    /// Defaults to `path` itself for filesystems without links.
    async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(path.to_owned())
    }
}

/// [`LocalFs`] over the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

#[async_trait]
impl LocalFs for TokioFs {
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<LocalEntry>> {
        let mut dir = fs::read_dir(path).await?;
        let mut entries = Vec::new();

        while let Some(entry) = dir.next_entry().await? {
            // follows symlinks
            let metadata = fs::metadata(entry.path()).await?;
            entries.push(LocalEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: metadata.is_dir(),
            });
        }

        Ok(entries)
    }

    async fn open(&self, path: &Path) -> io::Result<Box<dyn AsyncRead + Unpin + Send>> {
        Ok(Box::new(fs::File::open(path).await?))
    }

    async fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path).await
    }
}
