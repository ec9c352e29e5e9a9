//! Series directory storage on disk.
//!
//! All paths handed to a [`SeriesStore`] are relative to the series root, e.g.
//! `0001/0003: Title/0000.jpg`.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Filesystem operations the downloader needs, rooted at one series directory.
pub trait SeriesStore: Send + Sync {
    /// Check whether a relative path exists.
    fn exists(&self, path: &str) -> bool;

    /// Create a directory and any missing parents.
    ///
    /// With `recreate` false an existing directory is an error.
    fn make_dir(&self, path: &str, recreate: bool) -> io::Result<()>;

    /// Write a whole file, replacing any previous content.
    fn write_bytes(&self, path: &str, content: &[u8]) -> io::Result<()>;
}

/// [`SeriesStore`] backed by a local directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open a store, creating the root directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a relative store path.
    ///
    /// Only plain path segments are accepted; `..`, absolute paths and drive
    /// prefixes would leave the series root and are `InvalidInput`.
    pub fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let escapes = Path::new(path).components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path leaves the series directory: {:?}", path),
            ));
        }
        Ok(self.root.join(path))
    }
}

impl SeriesStore for LocalStore {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|full| full.exists()).unwrap_or(false)
    }

    fn make_dir(&self, path: &str, recreate: bool) -> io::Result<()> {
        let full = self.resolve(path)?;
        if full.is_dir() {
            if recreate {
                return Ok(());
            }
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("directory already exists: {}", full.display()),
            ));
        }
        std::fs::create_dir_all(full)
    }

    fn write_bytes(&self, path: &str, content: &[u8]) -> io::Result<()> {
        std::fs::write(self.resolve(path)?, content)
    }
}
