//! # Tree Enumerator
//!
//! Lazy depth-first listing of a directory tree, built on `walkdir`.
//!
//! Semantics:
//! - The root itself is never yielded; it must be a directory.
//! - With `recursive`, directories are descended into and not yielded, so the
//!   sequence holds only leaves (files, and symlinks when links are not
//!   followed). A subtree's entries come before the siblings that follow it.
//! - Without `recursive`, the root's immediate children are yielded as-is,
//!   directories included.
//! - A symlink to a directory counts as a directory only with
//!   `follow_symlinks`. When following links, walkdir reports a cycle as an
//!   error item instead of looping. A dangling link resolves to nothing, so it
//!   is yielded as a leaf of kind [`EntryKind::Symlink`].
//! - Sibling order is whatever the OS returns from `readdir`.
//!
//! Errors are produced lazily, as items, at the point the failing directory is
//! opened. Constructing a [`TreeScan`] never touches the filesystem.

use crate::error::{PathlogError, Result};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub follow_symlinks: bool,
    pub recursive: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            recursive: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Other,
}

/// One filesystem entry produced by a [`TreeScan`].
#[derive(Debug, Clone)]
pub struct TreeEntry {
    path: PathBuf,
    file_name: OsString,
    kind: EntryKind,
    is_symlink: bool,
    depth: usize,
}

impl TreeEntry {
    fn from_walk(entry: DirEntry) -> Self {
        let ft = entry.file_type();
        let kind = if ft.is_dir() {
            EntryKind::Dir
        } else if ft.is_file() {
            EntryKind::File
        } else if ft.is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::Other
        };
        Self {
            kind,
            is_symlink: entry.path_is_symlink(),
            depth: entry.depth(),
            file_name: entry.file_name().to_os_string(),
            path: entry.into_path(),
        }
    }

    /// A followed link whose target does not exist.
    fn dangling(err: &walkdir::Error) -> Option<Self> {
        if err.depth() == 0 || err.loop_ancestor().is_some() {
            return None;
        }
        let path = err.path()?;
        let io_err = err.io_error()?;
        if io_err.kind() != io::ErrorKind::NotFound {
            return None;
        }
        let meta = fs::symlink_metadata(path).ok()?;
        if !meta.file_type().is_symlink() {
            return None;
        }
        Some(Self {
            path: path.to_path_buf(),
            file_name: path.file_name()?.to_os_string(),
            kind: EntryKind::Symlink,
            is_symlink: true,
            depth: err.depth(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.file_name.to_string_lossy().into_owned()
    }

    /// Kind as seen by the scan: links are reported as links unless the scan
    /// follows them to an existing target.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Whether the entry was reached through a symlink.
    pub fn is_symlink(&self) -> bool {
        self.is_symlink
    }

    /// Depth below the scan root, starting at 1.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

pub fn scan_tree(root: impl AsRef<Path>, options: ScanOptions) -> TreeScan {
    let walker = WalkDir::new(root.as_ref())
        .follow_links(options.follow_symlinks)
        .max_depth(if options.recursive { usize::MAX } else { 1 });

    TreeScan {
        inner: walker.into_iter(),
        recursive: options.recursive,
    }
}

/// Iterator returned by [`scan_tree`]. Not restartable; scan again for a fresh
/// listing.
pub struct TreeScan {
    inner: walkdir::IntoIter,
    recursive: bool,
}

impl Iterator for TreeScan {
    type Item = Result<TreeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    return Some(match TreeEntry::dangling(&err) {
                        Some(leaf) => Ok(leaf),
                        None => Err(PathlogError::Scan(err)),
                    });
                }
            };

            let is_dir = entry.file_type().is_dir();
            if entry.depth() == 0 {
                if is_dir {
                    continue;
                }
                let err = io::Error::new(
                    io::ErrorKind::NotADirectory,
                    format!("{}: not a directory", entry.path().display()),
                );
                return Some(Err(err.into()));
            }

            if self.recursive && is_dir {
                continue;
            }
            return Some(Ok(TreeEntry::from_walk(entry)));
        }
    }
}
