use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use anyhow::Result;
use log::{debug, warn};
use walkdir::WalkDir;

use crate::manifest::Manifest;
use crate::models::FileEntry;
use crate::security::path_validator::{canonical_root, path_in_tree};

/// A directory's children split into the two groups the walk emits.
struct Listing {
    folders: Vec<(String, PathBuf)>,
    files: Vec<(String, PathBuf)>,
}

impl Manifest {
    /// Add a file or directory tree to the manifest.
    ///
    /// - A single file is added under its basename.
    /// - A directory without a trailing separator (`logs`) is added as a
    ///   top-level folder named after itself, followed by its contents
    ///   under `logs/...`.
    /// - A directory with a trailing separator (`logs/`) contributes only
    ///   its contents, relative to the directory itself.
    ///
    /// Entries whose real path falls outside the real path of the given
    /// directory are skipped silently. Symlinked directories are listed but
    /// never descended into. Paths that do not exist are logged and ignored.
    ///
    /// May be called repeatedly to merge several sources into one manifest.
    /// Relative paths already present are skipped, so adding the same
    /// source twice changes nothing.
    pub fn add<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();

        if path.is_file() {
            let relative = file_name_of(path);
            self.push(FileEntry::new(Some(path), &relative, None));
            return Ok(());
        }

        if !path.is_dir() {
            warn!("Skipping {}: not a file or directory", path.display());
            return Ok(());
        }

        let root = canonical_root(path)?;
        let mut entries = Vec::new();

        let prefix = if has_trailing_separator(path) {
            String::new()
        } else {
            let name = match path.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => file_name_of(&root),
            };
            entries.push(FileEntry::new(Some(path), &name, Some(name.as_str())));
            name
        };

        walk_directory(path, &root, &prefix, &mut entries);
        let found = entries.len();
        let added = self.extend(entries);
        debug!(
            "Enumerated {} entries under {} ({} already listed)",
            found,
            path.display(),
            found - added
        );
        Ok(())
    }
}

/// Walk `dir` top-down: all subfolders, then all files, then each subfolder's contents.
fn walk_directory(dir: &Path, root: &Path, relative: &str, entries: &mut Vec<FileEntry>) {
    let listing = match list_directory(dir) {
        Some(listing) => listing,
        None => return,
    };

    for (name, full_path) in &listing.folders {
        if !path_in_tree(root, full_path) {
            continue;
        }
        let relative_name = join_relative(relative, name);
        entries.push(FileEntry::new(Some(full_path.as_path()), &relative_name, Some(name.as_str())));
    }

    for (name, full_path) in &listing.files {
        if !path_in_tree(root, full_path) {
            continue;
        }
        let relative_name = join_relative(relative, name);
        entries.push(FileEntry::new(Some(full_path.as_path()), &relative_name, None));
    }

    for (name, full_path) in &listing.folders {
        // Directory symlinks are listed above but not followed, which also rules out cycles
        if full_path.is_symlink() {
            continue;
        }
        walk_directory(full_path, root, &join_relative(relative, name), entries);
    }
}

fn list_directory(dir: &Path) -> Option<Listing> {
    let mut folders = Vec::new();
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to read entry in {}: {}", dir.display(), e);
                if e.depth() == 0 {
                    return None;
                }
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        let full_path = entry.into_path();

        // Follows symlinks, so a link to a directory counts as a folder
        if full_path.is_dir() {
            folders.push((name, full_path));
        } else {
            files.push((name, full_path));
        }
    }

    sort_case_insensitive(&mut folders);
    sort_case_insensitive(&mut files);
    Some(Listing { folders, files })
}

fn sort_case_insensitive(items: &mut [(String, PathBuf)]) {
    items.sort_by(|(a, _), (b, _)| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
}

fn join_relative(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

fn has_trailing_separator(path: &Path) -> bool {
    let raw = path.to_string_lossy();
    raw.ends_with('/') || raw.ends_with(MAIN_SEPARATOR)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
