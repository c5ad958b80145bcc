//! Where `include` and `config_dir` paths are resolved.

#[cfg(test)]
#[path = "./dir_tests.rs"]
pub(crate) mod tests;

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// A directory handle that files and subdirectories are opened relative to.
///
/// [`FsDir`] is the filesystem implementation; hosts can supply their own to
/// load configs from an archive, an embedded bundle or memory.
pub trait Directory: Sized {
    type File: Read;

    /// Opens `path` for reading, relative to this directory.
    fn open_file(&self, path: &str) -> io::Result<Self::File>;

    /// Opens `path` as a directory, relative to this directory.
    fn open_dir(&self, path: &str) -> io::Result<Self>;

    /// Human readable form of `path` used in error locations.
    fn display(&self, path: &str) -> String {
        path.to_owned()
    }
}

/// A [`Directory`] on the local filesystem.
#[derive(Clone, Debug)]
pub struct FsDir {
    root: PathBuf,
}

impl FsDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The process working directory.
    pub fn cwd() -> Self {
        Self::new(".")
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

impl Default for FsDir {
    fn default() -> Self {
        Self::cwd()
    }
}

impl Directory for FsDir {
    type File = File;

    fn open_file(&self, path: &str) -> io::Result<File> {
        File::open(self.root.join(path))
    }

    fn open_dir(&self, path: &str) -> io::Result<Self> {
        let root = self.root.join(path);
        if !std::fs::metadata(&root)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }

    fn display(&self, path: &str) -> String {
        self.root.join(path).display().to_string()
    }
}
