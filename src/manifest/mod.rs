//! The ordered list of entries prepared for upload.
//!
//! A [`Manifest`] always starts with the synthetic root entry
//! (`relative_path == ""`). Sources are merged into it with
//! [`Manifest::add`], listing pages are spliced in by
//! [`crate::index::Indexer`], and the finished manifest is handed to
//! [`crate::cloud::uploader::Uploader`].
//!
//! The manifest owns the temporary directories holding generated pages.
//! They are removed when the manifest is dropped or explicitly closed,
//! including when a run bails out early with an error.
//!
//! ## Ordering
//!
//! Within each directory, subdirectories are listed before files and each
//! group is sorted case-insensitively. A directory's own contents follow
//! after all of its siblings. The indexer depends on this order to place
//! each listing page right after the last member of its directory.
//!
//! Relative paths are unique. Adding a path that is already present (the
//! same source added twice, or two sources sharing a basename) keeps the
//! first entry and drops the later one.

use std::collections::HashSet;
use std::path::Path;
use std::slice;

use anyhow::{Context, Result};
use log::debug;
use tempfile::TempDir;

use crate::constants::TEMPDIR_PREFIX;
use crate::models::FileEntry;

/// MIME type and encoding detection by extension
pub mod mime;

/// Directory enumeration into a manifest
pub mod walker;

#[derive(Debug)]
pub struct Manifest {
    entries: Vec<FileEntry>,
    paths: HashSet<String>,
    tempdirs: Vec<TempDir>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

impl Manifest {
    /// Create a manifest holding only the root entry.
    pub fn new() -> Self {
        let root = FileEntry::root();
        Manifest {
            paths: HashSet::from([root.relative_path.clone()]),
            entries: vec![root],
            tempdirs: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn iter(&self) -> slice::Iter<'_, FileEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, relative_path: &str) -> bool {
        self.paths.contains(relative_path)
    }

    /// Find an entry by its relative path.
    pub fn get(&self, relative_path: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.relative_path == relative_path)
    }

    /// Create a private temporary directory removed together with the manifest.
    pub fn tempdir(&mut self) -> Result<&Path> {
        let dir = tempfile::Builder::new()
            .prefix(TEMPDIR_PREFIX)
            .tempdir()
            .context("Failed to create temporary directory")?;
        debug!("Created temporary directory {}", dir.path().display());
        self.tempdirs.push(dir);
        Ok(self.tempdirs[self.tempdirs.len() - 1].path())
    }

    /// Remove all temporary directories, reporting the first failure.
    ///
    /// Dropping the manifest performs the same cleanup silently.
    pub fn close(mut self) -> Result<()> {
        let mut result = Ok(());
        for dir in self.tempdirs.drain(..) {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                if result.is_ok() {
                    result = Err(e).context(format!(
                        "Failed to remove temporary directory {}",
                        path.display()
                    ));
                }
            }
        }
        result
    }

    /// Append an entry unless its relative path is already listed.
    ///
    /// Returns whether the entry was added.
    pub(crate) fn push(&mut self, entry: FileEntry) -> bool {
        if !self.paths.insert(entry.relative_path.clone()) {
            debug!("Skipping duplicate entry {}", entry);
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Append entries in order, skipping already listed paths.
    ///
    /// Returns the number of entries added.
    pub(crate) fn extend<I: IntoIterator<Item = FileEntry>>(&mut self, entries: I) -> usize {
        let mut added = 0;
        for entry in entries {
            if self.push(entry) {
                added += 1;
            }
        }
        added
    }

    pub(crate) fn replace_entries(&mut self, entries: Vec<FileEntry>) {
        self.paths = entries.iter().map(|e| e.relative_path.clone()).collect();
        self.entries = entries;
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a FileEntry;
    type IntoIter = slice::Iter<'a, FileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
