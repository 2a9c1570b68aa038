//! Directory traversal for mirror runs.
//!
//! Produces a lazy sequence of regular files under a root directory, each
//! paired with its path relative to that root.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::utils::errors::{BackupError, Result};

/// A single file discovered under the mirror root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Full path to the file on the local filesystem
    pub absolute_path: PathBuf,

    /// Path relative to the mirror root
    pub relative_path: PathBuf,
}

/// Lazy iterator over every regular file under a root directory.
///
/// Symlinks that resolve to regular files are yielded like any other file;
/// broken symlinks and symlinks to directories are skipped. Traversal order
/// is whatever the filesystem reports, but stable across runs.
#[derive(Debug)]
pub struct FileWalker {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

impl FileWalker {
    /// Start a traversal rooted at `root`.
    ///
    /// Fails up front when the root is missing or cannot be listed, so a
    /// mirror run never starts against a bad source.
    pub fn new(root: &Path) -> Result<Self> {
        match std::fs::read_dir(root) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(BackupError::NotFound(root.display().to_string()));
            }
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                return Err(BackupError::PermissionDenied(root.display().to_string()));
            }
            Err(e) => return Err(BackupError::Io(e)),
        }

        Ok(Self {
            root: root.to_path_buf(),
            inner: WalkDir::new(root).into_iter(),
        })
    }

    fn entry_for(&self, entry: &walkdir::DirEntry) -> Option<FileEntry> {
        if entry.file_type().is_dir() {
            return None;
        }

        let path = entry.path().to_path_buf();
        if entry.file_type().is_symlink() {
            // Resolve the target; skip broken links and links to directories
            match std::fs::metadata(&path) {
                Ok(resolved) if resolved.is_file() => {}
                _ => return None,
            }
        }

        let relative_path = path
            .strip_prefix(&self.root)
            .unwrap_or(&path)
            .to_path_buf();

        Some(FileEntry {
            absolute_path: path,
            relative_path,
        })
    }
}

impl Iterator for FileWalker {
    type Item = Result<FileEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let kind = e.io_error().map(io::Error::kind);
                    let path = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| self.root.display().to_string());
                    let err = match kind {
                        Some(io::ErrorKind::NotFound) => BackupError::NotFound(path),
                        Some(io::ErrorKind::PermissionDenied) => {
                            BackupError::PermissionDenied(path)
                        }
                        _ => BackupError::Io(io::Error::other(e)),
                    };
                    return Some(Err(err));
                }
            };

            if let Some(file) = self.entry_for(&entry) {
                return Some(Ok(file));
            }
        }
    }
}
